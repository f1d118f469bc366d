//! Behaviour of individual doodles outside a drawing

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, TAU};
use std::time::Duration;

use doodlekit::doodle::{ClassName, Doodle, DoodleBehaviour, SavedDoodle, TrialLens};
use doodlekit::handles::VectorRange;
use doodlekit::render::{DrawCommand, RecordingCanvas};
use doodlekit::surface::{DrawingContext, EmptySurface};
use doodlekit::types::{AngleRange, Range, polar};
use glam::{DVec2, dvec2};
use proptest::prelude::*;

fn new_doodle(class: ClassName) -> Doodle {
    Doodle::new(class, &mut EmptySurface::default())
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn focal_choroiditis_handles_start_round_a_circle() {
    let doodle = new_doodle(ClassName::FocalChoroiditis);
    let origin = doodle.origin();
    for i in 0..4 {
        let offset = doodle.handle_location(i).unwrap() - origin;
        assert!(close(offset.length(), 80.0), "handle {i} at {offset}");
        let expected = i as f64 * FRAC_PI_2;
        let angle = polar::direction(offset);
        assert!(
            close(angle, expected) || close(angle, expected + TAU),
            "handle {i} at angle {angle}"
        );
    }
}

#[test]
fn focal_choroiditis_drag_is_clamped_to_range() {
    let mut doodle = new_doodle(ClassName::FocalChoroiditis);

    doodle.drag_handle(1, dvec2(500.0, 0.0)).unwrap();
    let p = doodle.squiggles()[0].points[1];
    assert!(close(p.length(), 290.0));
    assert!(close(polar::direction(p), FRAC_PI_2));

    // Handle 0 owns the sector around 12 o'clock; 3 o'clock snaps to its edge
    doodle.drag_handle(0, dvec2(300.0, 0.0)).unwrap();
    let p = doodle.squiggles()[0].points[0];
    assert!(close(p.length(), 290.0));
    assert!(close(polar::direction(p), FRAC_PI_4));

    doodle.drag_handle(2, dvec2(0.0, 10.0)).unwrap();
    assert!(close(doodle.squiggles()[0].points[2].length(), 50.0));
}

#[test]
fn locked_focal_choroiditis_ignores_drags() {
    let mut doodle = new_doodle(ClassName::FocalChoroiditis);
    let before = doodle.squiggles()[0].points[1];
    doodle.flags_mut().is_locked = true;
    let changes = doodle.drag_handle(1, dvec2(200.0, 0.0)).unwrap();
    assert!(changes.is_empty());
    assert_eq!(doodle.squiggles()[0].points[1], before);
}

#[test]
fn wrapping_angle_range() {
    let range = AngleRange::from_degrees(350.0, 10.0);
    assert!(range.wraps());
    for inside in [350.0_f64, 355.0, 0.0, 5.0, 10.0] {
        assert!(range.includes(inside.to_radians()), "{inside}° should be inside");
    }
    for outside in [11.0_f64, 90.0, 180.0, 349.0] {
        assert!(!range.includes(outside.to_radians()), "{outside}° should be outside");
    }
    assert!(close(range.constrain(20f64.to_radians()), 10f64.to_radians()));
    assert!(close(range.constrain(340f64.to_radians()), 350f64.to_radians()));
}

#[test]
fn trial_lens_axis_drives_rotation() {
    let mut lens = new_doodle(ClassName::TrialLens);
    // Placed at axis 0, which this clock shows as 180
    assert!(close(lens.number("axis"), 180.0));
    assert!(close(lens.number("rotation"), 0.0));

    lens.set_parameter("axis", 45.0).unwrap();
    assert!(close(lens.number("rotation"), TrialLens::rotation_for_axis(45.0)));

    lens.set_parameter("rotation", 0.5).unwrap();
    assert!(lens.params().is_animating());
    while lens.advance(Duration::from_millis(16)) {}
    assert!(close(lens.number("axis"), TrialLens::axis_for_rotation(0.5)));
}

#[test]
fn trial_lens_paints_an_annulus_with_marks() {
    let mut lens = new_doodle(ClassName::TrialLens);
    let mut canvas = RecordingCanvas::new();
    lens.render(&mut canvas, &DrawingContext::default(), None);
    insta::assert_snapshot!(canvas.describe().trim_end(), @r"
    fill rgba(255, 100, 100, 1) [3]
    stroke rgba(128, 128, 128, 1) w4 [3]
    stroke rgba(0, 0, 0, 1) w16 [4]
    ");
}

#[test]
fn keratic_precipitates_description_follows_spot_size() {
    let mut kp = new_doodle(ClassName::KeraticPrecipitates);
    assert_eq!(kp.description(), "Keratic precipitates");
    kp.set_parameter("apexX", 60.0).unwrap();
    assert_eq!(kp.number("apexX"), 40.0);
    assert_eq!(kp.description(), "Mutton fat keratic precipitates");
}

#[test]
fn caries_description_lists_surfaces() {
    let mut caries = new_doodle(ClassName::Caries);
    assert_eq!(caries.description(), "? has caries in the occlusal position");
    caries.set_parameter("locations", 5.0).unwrap();
    assert_eq!(caries.description(), "? has caries in the distal mesial position");
}

#[test]
fn saved_doodle_survives_json() {
    let mut lesion = new_doodle(ClassName::FocalChoroiditis);
    lesion.drag_handle(1, dvec2(200.0, 0.0)).unwrap();
    lesion.set_parameter("pigmented", true).unwrap();

    let saved = lesion.saved();
    let json = serde_json::to_string(&saved).unwrap();
    let parsed: SavedDoodle = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, saved);

    let restored = Doodle::restore(&parsed, &EmptySurface::default()).unwrap();
    assert_eq!(restored.saved(), saved);
    assert!(restored.params().flag("pigmented"));
    assert_eq!(restored.squiggles()[0].points[1], lesion.squiggles()[0].points[1]);
}

#[test]
fn restore_ignores_parameters_the_class_does_not_save() {
    let mut saved = new_doodle(ClassName::HardExudate).saved();
    saved.parameters.insert("rotation".into(), 1.0.into());
    saved.parameters.insert("originX".into(), 120.0.into());

    let restored = Doodle::restore(&saved, &EmptySurface::default()).unwrap();
    assert_eq!(restored.number("rotation"), 0.0);
    assert_eq!(restored.number("originX"), 120.0);
}

#[test]
fn restore_drops_mismatched_squiggle() {
    let lesion = new_doodle(ClassName::FocalChoroiditis);
    let mut saved = lesion.saved();
    saved.squiggles[0].points.truncate(2);

    let restored = Doodle::restore(&saved, &EmptySurface::default()).unwrap();
    assert_eq!(restored.squiggles()[0].len(), 4);
}

proptest! {
    #[test]
    fn trial_lens_hit_test_matches_annulus(x in -400.0..400.0f64, y in -400.0..400.0f64) {
        let r = dvec2(x, y).length();
        prop_assume!((r - 180.0).abs() > 2.0 && (r - 360.0).abs() > 2.0);

        let mut lens = new_doodle(ClassName::TrialLens);
        let ctx = DrawingContext::default();
        let hit = lens.hit_test(&ctx, dvec2(x, y));
        prop_assert_eq!(hit, r > 180.0 && r < 360.0);
        prop_assert_eq!(hit, lens.boundary().contains(dvec2(x, y)));
    }

    #[test]
    fn hit_test_uses_the_painted_outline(
        class in 0..ClassName::ALL.len(),
        x in -400.0..400.0f64,
        y in -400.0..400.0f64,
    ) {
        let mut doodle = new_doodle(ClassName::ALL[class]);
        let ctx = DrawingContext::default();
        let (outline, style) = doodle.kind().boundary(doodle.state());

        let mut canvas = RecordingCanvas::new();
        doodle.render(&mut canvas, &ctx, None);
        if style.has_fill() || style.has_stroke() {
            // The outline is painted before any decoration
            let painted = canvas.commands().iter().find_map(|c| match c {
                DrawCommand::Fill { path, .. } | DrawCommand::Stroke { path, .. } => Some(path),
                _ => None,
            });
            prop_assert_eq!(painted, Some(&outline));
        }

        let p = dvec2(x, y);
        let hit = doodle.hit_test(&ctx, p);
        prop_assert_eq!(hit, outline.contains(p));
        prop_assert_eq!(doodle.is_clicked(), hit);
    }

    #[test]
    fn axis_rotation_round_trip(axis in 0.0..180.0f64) {
        let back = TrialLens::axis_for_rotation(TrialLens::rotation_for_axis(axis));
        let diff = (back - axis).rem_euclid(180.0);
        prop_assert!(diff < 1e-9 || 180.0 - diff < 1e-9, "{axis} came back as {back}");
    }

    #[test]
    fn clamping_is_idempotent(
        x in -600.0..600.0f64,
        y in -600.0..600.0f64,
        start in 0.0..360.0f64,
        width in 1.0..359.0f64,
    ) {
        let length = Range::new(50.0, 290.0);
        let once = length.constrain(x);
        prop_assert_eq!(length.constrain(once), once);

        let range = VectorRange::new(length, AngleRange::from_degrees(start, start + width));
        let p = range.clamp(dvec2(x, y));
        let q = range.clamp(p);
        prop_assert!((p - q).length() < 1e-6, "{p} then {q}");
        prop_assert!(p.length() >= 50.0 - 1e-9 && p.length() <= 290.0 + 1e-9);
    }

    #[test]
    fn dragged_handles_stay_in_their_sector(x in -600.0..600.0f64, y in -600.0..600.0f64, i in 0usize..4) {
        prop_assume!(DVec2::new(x, y).length() > 1.0);
        let mut lesion = new_doodle(ClassName::FocalChoroiditis);
        lesion.drag_handle(i, dvec2(x, y)).unwrap();
        let p = lesion.squiggles()[0].points[i];
        let range = lesion.handles()[i].range.unwrap();
        prop_assert!((range.clamp(p) - p).length() < 1e-6);
    }
}

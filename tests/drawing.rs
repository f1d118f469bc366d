//! A drawing hosting doodles: input routing, notifications and painting

use std::cell::RefCell;
use std::rc::Rc;

use doodlekit::doodle::ClassName;
use doodlekit::drawing::Drawing;
use doodlekit::notify::{EventFilter, EventName, Notification, Payload, Subscriber};
use doodlekit::params::ParameterValue;
use doodlekit::render::RecordingCanvas;
use doodlekit::surface::ChartBox;
use glam::dvec2;

#[derive(Default)]
struct ParameterLog(Vec<(String, ParameterValue)>);

impl Subscriber for ParameterLog {
    fn notify(&mut self, notification: &Notification) {
        if let Payload::Parameter { name, value, .. } = &notification.payload {
            self.0.push((name.clone(), value.clone()));
        }
    }
}

fn watch_parameters(drawing: &mut Drawing) -> Rc<RefCell<ParameterLog>> {
    let log = Rc::new(RefCell::new(ParameterLog::default()));
    drawing.add_view(
        Box::new(log.clone()),
        EventFilter::only([EventName::ParameterChanged]),
    );
    log
}

#[test]
fn caries_surface_toggles_on_mouse_down() {
    let cells = [ChartBox { number: 18, position: dvec2(0.0, 0.0) }];
    let mut drawing = Drawing::default().with_chart(cells);
    let log = watch_parameters(&mut drawing);
    let caries = drawing.add_doodle(ClassName::Caries);
    assert_eq!(drawing.selected(), Some(caries));

    // Tooth at originX 0: the cell starts 0.3·1500 + 20 = 470 px across
    drawing.mouse_down(dvec2(480.0, 100.0));
    let doodle = drawing.doodle(caries).unwrap();
    assert_eq!(doodle.number("locations"), 17.0);
    assert_eq!(
        doodle.description(),
        "18 has caries in the distal occlusal position"
    );
    assert_eq!(
        log.borrow().0,
        vec![("locations".to_string(), ParameterValue::Number(17.0))]
    );

    // The press landed outside the tooth, so the caries is no longer selected
    assert_eq!(drawing.selected(), None);
    drawing.mouse_down(dvec2(480.0, 100.0));
    assert_eq!(drawing.doodle(caries).unwrap().number("locations"), 17.0);
}

/// Press at `(x, y)` within the tooth cell, then reselect the tooth
fn press_surface(drawing: &mut Drawing, x: f64, y: f64) -> u32 {
    let caries = drawing.first_of_class(ClassName::Caries).unwrap();
    drawing.mouse_down(dvec2(470.0 + x, 70.0 + y));
    let locations = drawing.doodle(caries).unwrap().number("locations") as u32;
    assert_eq!(drawing.mouse_down(dvec2(0.0, 0.0)), Some(caries));
    locations
}

#[test]
fn caries_surface_regions() {
    let cells = [ChartBox { number: 36, position: dvec2(0.0, 0.0) }];
    let mut drawing = Drawing::default().with_chart(cells);
    drawing.add_doodle(ClassName::Caries);

    assert_eq!(press_surface(&mut drawing, 50.0, 30.0), 16 | 4, "mesial");
    assert_eq!(press_surface(&mut drawing, 30.0, 5.0), 16 | 4 | 2, "buccal");
    assert_eq!(press_surface(&mut drawing, 30.0, 50.0), 16 | 4 | 2 | 8, "palatal");
    assert_eq!(press_surface(&mut drawing, 30.0, 30.0), 4 | 2 | 8, "occlusal off");
}

#[test]
fn parameter_changes_are_announced_with_dependents() {
    let mut drawing = Drawing::default();
    let log = watch_parameters(&mut drawing);
    let lens = drawing.add_doodle(ClassName::TrialLens);

    drawing.set_parameter(lens, "axis", 90.0).unwrap();
    let names: Vec<String> = log.borrow().0.iter().map(|(n, _)| n.clone()).collect();
    assert_eq!(names, vec!["axis", "rotation"]);
}

#[test]
fn locked_doodles_are_not_selected() {
    let mut drawing = Drawing::default();
    let exudate = drawing.add_doodle(ClassName::HardExudate);
    let origin = drawing.doodle(exudate).unwrap().origin();
    drawing.set_locked(exudate, true).unwrap();

    assert_eq!(drawing.mouse_down(origin), None);
    assert!(!drawing.doodle(exudate).unwrap().flags().is_selected);
}

#[test]
fn front_doodle_wins_the_hit() {
    let mut drawing = Drawing::default();
    let lesion = drawing.add_doodle(ClassName::FocalChoroiditis);
    let lens = drawing.add_doodle(ClassName::TrialLens);
    let exudate = drawing.add_doodle(ClassName::HardExudate);

    let order: Vec<_> = drawing.doodles().map(|(id, _)| id).collect();
    assert_eq!(order, vec![lens, lesion, exudate]);

    let origin = drawing.doodle(exudate).unwrap().origin();
    assert_eq!(drawing.mouse_down(origin), Some(exudate));

    // The lesion lies over the lens rim
    let lesion_origin = drawing.doodle(lesion).unwrap().origin();
    assert_eq!(drawing.mouse_down(lesion_origin), Some(lesion));

    assert_eq!(drawing.mouse_down(dvec2(300.0, 0.0)), Some(lens));
}

#[test]
fn handle_drag_in_canvas_pixels() {
    let mut drawing = Drawing::default();
    let kp = drawing.add_doodle(ClassName::KeraticPrecipitates);
    let log = watch_parameters(&mut drawing);

    // Apex handle, pulled well past its range
    drawing.drag_handle(kp, 4, dvec2(100.0, -300.0)).unwrap();
    let doodle = drawing.doodle(kp).unwrap();
    assert_eq!(doodle.number("apexX"), 40.0);
    assert_eq!(doodle.number("apexY"), -160.0);
    assert_eq!(log.borrow().0.len(), 2);
}

#[test]
fn selected_doodle_paints_its_handles() {
    let mut drawing = Drawing::default();
    drawing.add_doodle(ClassName::FocalChoroiditis);

    let mut canvas = RecordingCanvas::new();
    drawing.render(&mut canvas);
    insta::assert_snapshot!(canvas.describe().trim_end(), @r"
    fill rgba(255, 255, 0, 0.8) [6]
    stroke rgba(255, 255, 0, 0.8) w8 [6]
    rotate (-200, -280)
    handle (-120, -200)
    handle (-200, -120)
    handle (-280, -200)
    ");
}

#[test]
fn saved_drawing_restores_in_order() {
    let mut drawing = Drawing::default();
    drawing.add_doodle(ClassName::HardExudate);
    drawing.add_doodle(ClassName::FocalChoroiditis);
    drawing.add_doodle(ClassName::HardExudate);
    let saved = drawing.saved_doodles();

    let mut copy = Drawing::default();
    copy.restore_doodles(&saved).unwrap();
    assert_eq!(copy.saved_doodles(), saved);
    assert_eq!(copy.report(), drawing.report());
}

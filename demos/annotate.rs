//! Annotate a dental chart and a fundus, printing what a host would see.
//!
//! Run with: RUST_LOG=debug cargo run --example annotate --features tracing

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use doodlekit::doodle::ClassName;
use doodlekit::drawing::Drawing;
use doodlekit::popup::DoodlePopup;
use doodlekit::render::RecordingCanvas;
use doodlekit::surface::{ChartBox, DrawingContext, Eye};
use glam::dvec2;

fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Upper right quadrant, 18 to 11, one cell per tooth
    let chart = (0..8).map(|i| ChartBox {
        number: 18 - i,
        position: dvec2(-700.0 + 200.0 * i as f64, 0.0),
    });
    let mut teeth = Drawing::new(DrawingContext::for_eye(Eye::Right)).with_chart(chart);
    let popup = Rc::new(RefCell::new(DoodlePopup::default()));
    teeth.add_view(Box::new(popup.clone()), DoodlePopup::filter());
    teeth.ready();

    let caries = teeth.add_doodle(ClassName::Caries);
    teeth.add_doodle(ClassName::BridgeRetainer);
    let fracture = teeth.add_doodle(ClassName::Fracture);
    teeth.set_parameter(caries, "locations", 1.0 + 16.0)?;
    teeth.advance(Duration::from_millis(50));

    println!("=== Dental chart ===");
    for line in teeth.report() {
        println!("{line}");
    }
    println!("popup: {:?} on {:?}", popup.borrow().state(), popup.borrow().shown_doodle().map(|d| d.id));

    teeth.delete_doodle(fracture)?;
    println!("after delete, popup: {:?}", popup.borrow().state());

    let mut fundus = Drawing::new(DrawingContext::for_eye(Eye::Left));
    let lesion = fundus.add_doodle(ClassName::FocalChoroiditis);
    fundus.add_doodle(ClassName::HardExudate);
    fundus.add_doodle(ClassName::HardExudate);
    fundus.set_parameter(lesion, "pigmented", true)?;
    fundus.drag_handle(lesion, 1, dvec2(450.0, -200.0))?;

    println!("\n=== Fundus ===");
    for line in fundus.report() {
        println!("{line}");
    }

    let mut canvas = RecordingCanvas::new();
    fundus.render(&mut canvas);
    print!("{}", canvas.describe());

    let saved = serde_json::to_string_pretty(&fundus.saved_doodles()).map_err(|e| miette::miette!("{e}"))?;
    println!("\n=== Saved ===\n{saved}");
    Ok(())
}

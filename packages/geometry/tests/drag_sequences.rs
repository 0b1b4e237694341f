//! Whatever happens between press and release, the committed geometry is
//! the one implied by the release position.

use proptest::prelude::*;
use retouch_geometry::{
    Geometry, GeometrySink, Handle, Point, PointerGeometryController, PointerId, Presenter,
    MIN_SIZE,
};
use std::time::{Duration, Instant};

#[derive(Default)]
struct Recorder {
    frames: Vec<Geometry>,
    commits: Vec<Geometry>,
}

impl Presenter for Recorder {
    fn present(&mut self, _target: &str, geometry: &Geometry) {
        self.frames.push(*geometry);
    }
}

impl GeometrySink for Recorder {
    fn commit(&mut self, _target: &str, geometry: &Geometry) {
        self.commits.push(*geometry);
    }
}

#[derive(Debug, Clone)]
struct Step {
    dx: f64,
    dy: f64,
    wait_ms: u64,
    frame: bool,
    poll: bool,
}

fn handle_strategy() -> impl Strategy<Value = Handle> {
    proptest::sample::select(Handle::ALL.to_vec())
}

fn step_strategy() -> impl Strategy<Value = Step> {
    (
        -300i32..300,
        -300i32..300,
        0u64..400,
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(dx, dy, wait_ms, frame, poll)| Step {
            dx: dx as f64,
            dy: dy as f64,
            wait_ms,
            frame,
            poll,
        })
}

proptest! {
    #[test]
    fn release_commits_geometry_of_final_pointer(
        handle in handle_strategy(),
        x in -500i32..500,
        y in -500i32..500,
        width in 50i32..800,
        height in 50i32..800,
        steps in proptest::collection::vec(step_strategy(), 0..40),
        release_dx in -300i32..300,
        release_dy in -300i32..300,
    ) {
        let pointer = PointerId(7);
        let start = Geometry::new(x as f64, y as f64, width as f64, height as f64);
        let origin = Point::new(400.0, 400.0);
        let mut controller = PointerGeometryController::new();
        let mut presenter = Recorder::default();
        let mut sink = Recorder::default();
        let mut now = Instant::now();

        controller.begin_session(pointer, "target", handle, origin, start);

        for step in &steps {
            now += Duration::from_millis(step.wait_ms);
            controller
                .pointer_move(pointer, Point::new(origin.x + step.dx, origin.y + step.dy), now)
                .unwrap();
            if step.frame {
                controller.animation_frame(&mut presenter);
            }
            if step.poll {
                controller.poll(now, &mut sink);
            }
        }

        let release = Point::new(origin.x + release_dx as f64, origin.y + release_dy as f64);
        let last = controller
            .pointer_up(pointer, release, &mut presenter, &mut sink)
            .unwrap();

        let expected = handle.apply(&start, release_dx as f64, release_dy as f64, MIN_SIZE);
        prop_assert_eq!(last, expected);
        prop_assert_eq!(*sink.commits.last().unwrap(), expected);
        prop_assert_eq!(*presenter.frames.last().unwrap(), expected);
        prop_assert!(expected.width >= MIN_SIZE);
        prop_assert!(expected.height >= MIN_SIZE);
        prop_assert!(!controller.is_active(pointer));
    }
}

#[test]
fn top_left_example_from_start_geometry() {
    let mut controller = PointerGeometryController::new();
    let mut presenter = Recorder::default();
    let mut sink = Recorder::default();
    let pointer = PointerId(1);

    controller.begin_session(
        pointer,
        "banner",
        Handle::TopLeft,
        Point::new(0.0, 0.0),
        Geometry::new(0.0, 0.0, 200.0, 100.0),
    );
    controller
        .pointer_move(pointer, Point::new(20.0, 10.0), Instant::now())
        .unwrap();
    let last = controller
        .pointer_up(pointer, Point::new(20.0, 10.0), &mut presenter, &mut sink)
        .unwrap();

    assert_eq!(last, Geometry::new(20.0, 10.0, 180.0, 90.0));
    assert_eq!(sink.commits, vec![last]);
}

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tessella_testing::FrameDriver;
use tessella_ui::{AnimationState, Animator, Interpolator};

#[test]
fn a_full_timeline_runs_at_the_frame_cadence() {
    let driver = FrameDriver::new();
    let values = Rc::new(RefCell::new(Vec::new()));

    let sink = values.clone();
    let animator = Animator::number(driver.handle(), move |value| {
        sink.borrow_mut().push(value);
    });
    animator.set_duration(64.0).unwrap();
    animator.set_from(0.0).unwrap();
    animator.set_to(100.0).unwrap();

    animator.start().unwrap();
    driver.run_frames(5, 16);

    assert_eq!(*values.borrow(), vec![0.0, 25.0, 50.0, 75.0, 100.0]);
    assert_eq!(animator.state(), AnimationState::Stopped);
    assert!(!driver.has_pending_callbacks());
}

#[test]
fn the_final_frame_always_reports_the_end_value() {
    let driver = FrameDriver::new();
    let values = Rc::new(RefCell::new(Vec::new()));

    let sink = values.clone();
    let animator = Animator::number(driver.handle(), move |value| {
        sink.borrow_mut().push(value);
    });
    animator.set_duration(50.0).unwrap();

    animator.start().unwrap();
    driver.advance_millis(16);
    driver.advance_millis(16);
    // A frame lands well past the duration; progress clamps to 1.
    driver.advance_millis(500);

    assert_eq!(*values.borrow(), vec![0.0, 0.32, 1.0]);
}

#[test]
fn interpolation_shapes_the_delivered_values() {
    let driver = FrameDriver::new();
    let values = Rc::new(RefCell::new(Vec::new()));

    let sink = values.clone();
    let animator = Animator::number(driver.handle(), move |value| {
        sink.borrow_mut().push(value);
    });
    animator.set_duration(100.0).unwrap();
    animator
        .set_interpolator(Interpolator::accelerate(1.0).unwrap())
        .unwrap();

    animator.start().unwrap();
    driver.advance_millis(0);
    driver.advance_millis(50);
    driver.advance_millis(50);

    assert_eq!(*values.borrow(), vec![0.0, 0.25, 1.0]);
}

#[test]
fn iterations_repeat_and_end_once() {
    let driver = FrameDriver::new();
    let values = Rc::new(RefCell::new(Vec::new()));
    let ends = Rc::new(Cell::new(0u32));

    let sink = values.clone();
    let animator = Animator::number(driver.handle(), move |value| {
        sink.borrow_mut().push(value);
    });
    animator.set_duration(32.0).unwrap();
    animator.set_iterations(3.0).unwrap();
    let counter = ends.clone();
    animator.set_end_callback(move || counter.set(counter.get() + 1)).unwrap();

    animator.start().unwrap();
    driver.run_frames(8, 16);

    // Progress reaches exactly 1.0 once per iteration.
    assert_eq!(
        *values.borrow(),
        vec![0.0, 0.5, 1.0, 0.5, 1.0, 0.5, 1.0]
    );
    assert_eq!(ends.get(), 1);
    assert_eq!(animator.state(), AnimationState::Stopped);
}

#[test]
fn pause_freezes_virtual_time() {
    let driver = FrameDriver::new();
    let values = Rc::new(RefCell::new(Vec::new()));

    let sink = values.clone();
    let animator = Animator::number(driver.handle(), move |value| {
        sink.borrow_mut().push(value);
    });
    animator.set_duration(100.0).unwrap();

    animator.start().unwrap();
    driver.advance_millis(0);
    driver.advance_millis(30);
    animator.pause().unwrap();

    // Time passes while paused; nothing ticks.
    driver.run_frames(10, 100);
    assert_eq!(values.borrow().len(), 2);

    animator.resume().unwrap();
    driver.advance_millis(0);
    driver.advance_millis(70);

    assert_eq!(*values.borrow(), vec![0.0, 0.3, 0.3, 1.0]);
    assert_eq!(animator.state(), AnimationState::Stopped);
}

#[test]
fn dropping_every_handle_cancels_the_animation() {
    let driver = FrameDriver::new();
    let ticked = Rc::new(Cell::new(false));

    let flag = ticked.clone();
    let animator = Animator::number(driver.handle(), move |_| flag.set(true));
    animator.set_duration(100.0).unwrap();
    animator.start().unwrap();
    assert!(driver.has_pending_callbacks());

    drop(animator);
    driver.advance_millis(16);

    assert!(!ticked.get());
    assert!(!driver.has_pending_callbacks());
}

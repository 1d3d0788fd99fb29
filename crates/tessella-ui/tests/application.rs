use std::cell::Cell;
use std::rc::Rc;

use tessella_core::handler;
use tessella_graphics::{Canvas, Color};
use tessella_testing::{DrawOp, FrameDriver, HeadlessViewport};
use tessella_ui::{Application, ApplicationError, ResizeEvent, Theme, View, Widget};

fn app_with_view(driver: &FrameDriver) -> (Application, Rc<HeadlessViewport>, View) {
    let viewport = HeadlessViewport::new(640.0, 480.0);
    let app = Application::new(driver.handle(), viewport.clone()).expect("first application");
    let view = View::new();
    app.set_view(Some(view.clone()));
    (app, viewport, view)
}

#[test]
fn only_one_application_per_thread() {
    let driver = FrameDriver::new();
    let viewport = HeadlessViewport::new(100.0, 100.0);
    let app = Application::new(driver.handle(), viewport.clone()).unwrap();

    assert!(matches!(
        Application::new(driver.handle(), viewport.clone()),
        Err(ApplicationError::AlreadyRunning)
    ));
    assert!(Application::current().is_some());

    drop(app);
    assert!(Application::current().is_none());
    assert!(Application::new(driver.handle(), viewport).is_ok());
}

#[test]
fn construction_schedules_the_first_draw() {
    let driver = FrameDriver::new();
    let (_app, viewport, view) = app_with_view(&driver);
    view.set_background(Color::rgb(0.2, 0.2, 0.2));

    assert!(driver.has_pending_callbacks());
    driver.advance_millis(16);

    let canvas = viewport.recording();
    let canvas = canvas.borrow();
    assert_eq!(canvas.clear_count(), 1);
    // Background rect fills the viewport.
    let rect = canvas.ops().iter().find_map(|op| match op {
        DrawOp::Rect { rect, .. } => Some(*rect),
        _ => None,
    });
    let rect = rect.expect("background rect drawn");
    assert_eq!(rect.width, 640.0);
    assert_eq!(rect.height, 480.0);
}

#[test]
fn invalidations_between_frames_coalesce() {
    let driver = FrameDriver::new();
    let (app, viewport, _view) = app_with_view(&driver);
    driver.advance_millis(16);

    app.invalidate();
    app.invalidate();
    app.invalidate();
    driver.advance_millis(16);
    driver.advance_millis(16);

    // One clear for the initial draw, one for the coalesced batch.
    assert_eq!(viewport.recording().borrow().clear_count(), 2);
}

#[test]
fn property_mutations_invalidate_through_the_tree() {
    let driver = FrameDriver::new();
    let (_app, viewport, view) = app_with_view(&driver);
    let widget = Widget::new();
    view.add_child(&widget);
    driver.advance_millis(16);

    widget.set_x(25.0);
    driver.advance_millis(16);
    assert_eq!(viewport.recording().borrow().clear_count(), 2);

    // Detached widgets invalidate nothing.
    view.remove_child(&widget);
    driver.advance_millis(16);
    widget.set_x(50.0);
    assert!(!driver.has_pending_callbacks());
}

#[test]
fn resize_fires_handlers_and_redraws() {
    let driver = FrameDriver::new();
    let (app, viewport, view) = app_with_view(&driver);
    driver.advance_millis(16);

    let seen = Rc::new(Cell::new((0.0, 0.0)));
    let sink = seen.clone();
    app.on_resize().add(&handler(move |event: &ResizeEvent| {
        sink.set((event.width, event.height));
        false
    }));

    viewport.resize(800.0, 600.0);
    assert_eq!(seen.get(), (800.0, 600.0));
    driver.advance_millis(16);

    // The view tracks the viewport.
    assert_eq!(view.as_widget().width().unwrap(), 800.0);
    assert_eq!(view.as_widget().height().unwrap(), 600.0);
    assert_eq!(viewport.recording().borrow().clear_count(), 2);
}

#[test]
fn percentage_children_resolve_against_their_parent() {
    let driver = FrameDriver::new();
    let (_app, viewport, view) = app_with_view(&driver);

    let child = Widget::new();
    view.add_child(&child);
    child.set_width("50%").unwrap();
    child.set_height("25%").unwrap();

    assert_eq!(child.width().unwrap(), 320.0);
    assert_eq!(child.height().unwrap(), 120.0);

    // Live tracking: resize changes the resolved size without re-setting.
    viewport.resize(400.0, 400.0);
    assert_eq!(child.width().unwrap(), 200.0);
    assert_eq!(child.height().unwrap(), 100.0);
}

#[test]
fn device_pixel_lengths_divide_by_the_scale_factor() {
    let driver = FrameDriver::new();
    let viewport = HeadlessViewport::new(640.0, 480.0);
    viewport.set_scale_factor(2.0);
    let app = Application::new(driver.handle(), viewport.clone()).unwrap();
    let view = View::new();
    app.set_view(Some(view.clone()));

    let child = Widget::new();
    view.add_child(&child);
    child.set_width("64px").unwrap();
    assert_eq!(child.width().unwrap(), 32.0);
}

#[test]
fn draw_applies_the_scale_factor_to_the_canvas() {
    let driver = FrameDriver::new();
    let viewport = HeadlessViewport::new(300.0, 200.0);
    viewport.set_scale_factor(2.0);
    let _app = Application::new(driver.handle(), viewport.clone()).unwrap();

    driver.advance_millis(16);
    let canvas = viewport.recording();
    assert_eq!(canvas.borrow().width(), 600.0);
    assert_eq!(canvas.borrow().height(), 400.0);
    assert_eq!(canvas.borrow().scale_factor(), 2.0);
}

#[test]
fn replacing_the_view_detaches_the_old_root() {
    let driver = FrameDriver::new();
    let (app, _viewport, first) = app_with_view(&driver);
    assert!(first.as_widget().application().is_some());

    let second = View::new();
    app.set_view(Some(second.clone()));

    assert!(first.as_widget().application().is_none());
    assert!(second.as_widget().application().is_some());

    app.set_view(None);
    assert!(second.as_widget().application().is_none());
}

#[test]
fn theme_is_shared_and_replaceable() {
    let driver = FrameDriver::new();
    let (app, _viewport, _view) = app_with_view(&driver);
    assert!(app.theme().is_none());

    let mut theme = Theme::new();
    theme.set_color("primary", Some(Color::BLACK));
    app.set_theme(Some(theme));

    let current = app.theme().expect("theme set");
    assert_eq!(current.color("primary"), Some(Color::BLACK));

    app.set_theme(None);
    assert!(app.theme().is_none());
}

#[test]
fn find_by_id_searches_the_attached_tree() {
    let driver = FrameDriver::new();
    let (app, _viewport, view) = app_with_view(&driver);
    let widget = Widget::new();
    widget.set_id(Some("target"));
    view.add_child(&widget);

    assert!(app.find_by_id("target").unwrap().same(&widget));
    assert!(app.find_by_id("absent").is_none());
}

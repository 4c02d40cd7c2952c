//! End-to-end behavior of the engine driven through pointer events.

use inkleaf_app::{Engine, Script, run_script};
use inkleaf_core::{
    Corner, DecodeError, EngineConfig, EraserMode, FileSink, InkColor, MemorySink, Placement,
    PointerEvent, PointerKind, Raster, Snapshot, SnapshotSink, StorageResult, Tool,
};
use inkleaf_render::{
    Compositor, ImageCrateDecoder, Scene, SelectionStyle, Surface, decode_bytes, encode_png,
};
use kurbo::{Point, Size};
use std::sync::Arc;
use tempfile::TempDir;

struct Shared(Arc<MemorySink>);

impl SnapshotSink for Shared {
    fn save(&self, snapshot: &Snapshot) -> StorageResult<()> {
        self.0.save(snapshot)
    }

    fn load(&self, page_index: usize) -> StorageResult<Vec<u8>> {
        self.0.load(page_index)
    }
}

fn engine_with(config: EngineConfig) -> (Engine, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let engine = Engine::new(config, Box::new(Shared(sink.clone()))).unwrap();
    (engine, sink)
}

fn stylus(engine: &mut Engine, points: &[(f64, f64)]) {
    let pts: Vec<Point> = points.iter().map(|&(x, y)| Point::new(x, y)).collect();
    engine.handle_pointer(PointerEvent::down(pts[0], PointerKind::Stylus));
    for p in &pts[1..] {
        engine.handle_pointer(PointerEvent::moved(*p, PointerKind::Stylus));
    }
    engine.handle_pointer(PointerEvent::up(pts[pts.len() - 1], PointerKind::Stylus));
}

fn full_redraw_of(engine: &Engine) -> Surface {
    let mut surface = Surface::new(engine.page().size()).unwrap();
    Compositor::new(SelectionStyle::from_config(engine.config()))
        .render(&mut surface, &Scene::from_page(engine.page(), engine.zoom()));
    surface
}

fn png_of(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let rgba = [rgb[0], rgb[1], rgb[2], 255].repeat((width * height) as usize);
    encode_png(&rgba, width, height).unwrap()
}

#[test]
fn test_scenario_a_three_point_stroke() {
    let config = EngineConfig {
        tool: Tool::Pen,
        color: InkColor::BLACK,
        stroke_width: 3.0,
        ..EngineConfig::default()
    };
    let (mut engine, sink) = engine_with(config);
    stylus(&mut engine, &[(100.0, 100.0), (150.0, 120.0), (200.0, 180.0)]);

    let strokes = engine.page().strokes.strokes();
    assert_eq!(strokes.len(), 1);
    assert_eq!(strokes[0].len(), 3);
    assert!(!strokes[0].is_eraser());
    assert_eq!(strokes[0].style().color, InkColor::BLACK);
    assert!((strokes[0].style().width - 3.0).abs() < f64::EPSILON);
    assert_eq!(sink.save_count(), 1);
}

#[test]
fn test_scenario_b_resize_bottom_right() {
    let (mut engine, sink) = engine_with(EngineConfig::default());
    let ticket = engine.request_image(Placement::Natural {
        origin: Point::new(100.0, 100.0),
    });
    let raster = decode_bytes(&png_of(800, 600, [30, 60, 90])).unwrap();
    assert!(engine.complete_decode(&ticket, Ok(raster)));

    let image = engine.page().images.selected_image().unwrap();
    assert!((image.width - 800.0).abs() < f64::EPSILON);
    let handle = image
        .handles()
        .into_iter()
        .find(|(corner, _)| *corner == Corner::BottomRight)
        .map(|(_, p)| p)
        .unwrap();

    engine.handle_pointer(PointerEvent::down(handle, PointerKind::Mouse));
    engine.handle_pointer(PointerEvent::moved(handle + (25.0, 10.0), PointerKind::Mouse));
    engine.handle_pointer(PointerEvent::moved(handle + (50.0, 25.0), PointerKind::Mouse));
    engine.handle_pointer(PointerEvent::up(handle + (50.0, 25.0), PointerKind::Mouse));

    let image = engine.page().images.selected_image().unwrap();
    assert_eq!(image.position, Point::new(100.0, 100.0));
    assert!((image.width - 850.0).abs() < f64::EPSILON);
    assert!((image.height - 625.0).abs() < f64::EPSILON);
    // One save for the insert, one for the resize.
    assert_eq!(sink.save_count(), 2);
}

#[test]
fn test_scenario_c_object_erase() {
    let (mut engine, sink) = engine_with(EngineConfig::default());
    stylus(&mut engine, &[(100.0, 300.0), (150.0, 300.0), (200.0, 300.0)]);
    stylus(&mut engine, &[(100.0, 400.0), (150.0, 400.0), (200.0, 400.0)]);
    assert_eq!(sink.save_count(), 2);

    engine.set_tool(Tool::Eraser);
    engine.set_eraser_mode(EraserMode::Object);
    stylus(&mut engine, &[(150.0, 312.0)]);

    let strokes = engine.page().strokes.strokes();
    assert_eq!(strokes.len(), 1);
    assert!((strokes[0].points()[0].y - 400.0).abs() < f64::EPSILON);
    assert_eq!(sink.save_count(), 3);

    // A miss does not save.
    stylus(&mut engine, &[(900.0, 900.0)]);
    assert_eq!(sink.save_count(), 3);
}

#[test]
fn test_scenario_d_next_page_from_last() {
    let (mut engine, _) = engine_with(EngineConfig::default());
    assert_eq!(engine.page_count(), 1);
    assert_eq!(engine.next_page(), 1);
    assert_eq!(engine.page_count(), 2);
    assert_eq!(engine.current_page(), 1);
    assert!(engine.page().strokes.is_empty());
    assert!(engine.page().images.is_empty());
    assert!(engine.page().background().is_none());

    assert!(engine.prev_page());
    assert!(!engine.prev_page());
    assert_eq!(engine.current_page(), 0);
}

#[test]
fn test_scenario_e_zoom_keeps_visual_sizes() {
    let (mut engine, _) = engine_with(EngineConfig::default());
    stylus(&mut engine, &[(50.0, 50.0), (250.0, 50.0)]);
    let ticket = engine.request_image(Placement::default());
    engine.complete_decode(&ticket, Ok(Raster::solid(40, 30, [9, 9, 9]).unwrap()));

    let style = SelectionStyle::from_config(engine.config());
    let before = style.metrics(engine.zoom());
    assert!(engine.set_zoom(2.0));
    let after = style.metrics(engine.zoom());

    assert!((before.line_width * 1.0 - after.line_width * 2.0).abs() < 1e-9);
    assert!((before.handle_radius * 1.0 - after.handle_radius * 2.0).abs() < 1e-9);
    assert!((engine.page().strokes.strokes()[0].style().width - 3.0).abs() < f64::EPSILON);
    assert_eq!(engine.viewport().internal_size(), Size::new(1200.0, 1600.0));
    assert_eq!(engine.viewport().css_size(), Size::new(2400.0, 3200.0));
    assert_eq!(engine.surface().data(), full_redraw_of(&engine).data());
}

#[test]
fn test_live_painting_matches_full_redraw() {
    let (mut engine, _) = engine_with(EngineConfig::default());
    let ticket = engine.request_background();
    engine.complete_decode(&ticket, Ok(Raster::solid(400, 300, [240, 235, 220]).unwrap()));

    engine.set_color(InkColor::new(0xEF, 0x44, 0x44));
    engine.set_stroke_width(5.0);
    stylus(&mut engine, &[(20.0, 20.0), (60.5, 33.25), (120.0, 90.0), (121.0, 90.0)]);

    engine.set_tool(Tool::Pencil);
    stylus(&mut engine, &[(200.0, 20.0), (210.0, 200.0), (350.0, 250.0)]);

    engine.set_tool(Tool::Eraser);
    stylus(&mut engine, &[(0.0, 100.0), (399.0, 110.0)]);

    engine.set_tool(Tool::Pen);
    stylus(&mut engine, &[(30.0, 280.0)]);

    assert_eq!(engine.page().strokes.len(), 4);
    assert_eq!(engine.surface().data(), full_redraw_of(&engine).data());
}

#[test]
fn test_background_resizes_canvas() {
    let (mut engine, sink) = engine_with(EngineConfig::default());
    let ticket = engine.request_background();
    assert!(engine.complete_decode(&ticket, Ok(Raster::solid(640, 480, [1, 2, 3]).unwrap())));
    assert_eq!(engine.viewport().internal_size(), Size::new(640.0, 480.0));
    assert_eq!((engine.surface().width(), engine.surface().height()), (640, 480));
    assert_eq!(sink.save_count(), 0);

    // New pages fall back to the default resolution.
    engine.next_page();
    assert_eq!(engine.viewport().internal_size(), Size::new(1200.0, 1600.0));
    engine.prev_page();
    assert_eq!(engine.surface().width(), 640);
}

#[test]
fn test_stale_decodes_are_dropped() {
    let (mut engine, _) = engine_with(EngineConfig::default());

    let for_page_zero = engine.request_image(Placement::default());
    engine.next_page();
    let raster = Raster::solid(10, 10, [0, 0, 0]).unwrap();
    assert!(!engine.complete_decode(&for_page_zero, Ok(raster.clone())));
    assert!(engine.page().images.is_empty());
    engine.prev_page();
    assert!(engine.page().images.is_empty());

    let older = engine.request_background();
    let newer = engine.request_background();
    assert!(!engine.complete_decode(&older, Ok(raster.clone())));
    assert!(engine.page().background().is_none());
    assert!(engine.complete_decode(&newer, Ok(raster)));
    assert!(engine.page().background().is_some());
}

#[test]
fn test_decode_failure_keeps_ink() {
    let (mut engine, _) = engine_with(EngineConfig::default());
    stylus(&mut engine, &[(10.0, 10.0), (20.0, 20.0)]);
    let ticket = engine.request_background();
    assert!(!engine.complete_decode(&ticket, Err(DecodeError::Malformed("truncated".into()))));
    assert_eq!(engine.page().strokes.len(), 1);

    let inserted = pollster::block_on(engine.insert_image(
        &ImageCrateDecoder::new(),
        b"definitely not a png".to_vec(),
        Placement::default(),
    ));
    assert!(!inserted);
    assert!(engine.page().images.is_empty());
}

#[test]
fn test_palm_rejection_and_touch_drag() {
    let (mut engine, _) = engine_with(EngineConfig::default());
    let ticket = engine.request_image(Placement::default());
    engine.complete_decode(&ticket, Ok(Raster::solid(300, 300, [5, 5, 5]).unwrap()));
    engine.handle_pointer(PointerEvent::down(Point::new(900.0, 900.0), PointerKind::Touch));
    // Touch deselects but never draws with palm rejection on.
    assert_eq!(engine.page().images.selected(), None);
    engine.handle_pointer(PointerEvent::up(Point::new(900.0, 900.0), PointerKind::Touch));
    assert!(engine.page().strokes.is_empty());

    engine.handle_pointer(PointerEvent::down(Point::new(150.0, 150.0), PointerKind::Touch));
    engine.handle_pointer(PointerEvent::moved(Point::new(180.0, 170.0), PointerKind::Touch));
    engine.handle_pointer(PointerEvent::up(Point::new(180.0, 170.0), PointerKind::Touch));
    let image = engine.page().images.selected_image().unwrap();
    assert_eq!(image.position, Point::new(130.0, 120.0));
}

#[test]
fn test_snapshot_reopens_as_background() {
    let config = EngineConfig {
        page_size: Size::new(320.0, 240.0),
        ..EngineConfig::default()
    };
    let (mut engine, sink) = engine_with(config.clone());
    stylus(&mut engine, &[(20.0, 100.0), (160.0, 100.0), (300.0, 100.0)]);
    let saved = sink.latest(0).unwrap();
    assert!(saved.to_data_url().starts_with("data:image/png;base64,"));

    let mut reopened = Engine::new(config, Box::new(Shared(sink.clone()))).unwrap();
    let restored =
        pollster::block_on(reopened.restore_from_sink(&ImageCrateDecoder::new())).unwrap();
    assert!(restored);
    let background = reopened.page().background().unwrap();
    assert_eq!((background.width(), background.height()), (320, 240));
    assert!(reopened.page().strokes.is_empty());
    assert_eq!(reopened.surface().pixel(160, 100), Some([0, 0, 0, 255]));
}

#[test]
fn test_reopen_refused_on_page_with_content() {
    let (mut engine, _) = engine_with(EngineConfig {
        page_size: Size::new(320.0, 240.0),
        ..EngineConfig::default()
    });
    stylus(&mut engine, &[(20.0, 100.0), (160.0, 100.0), (300.0, 100.0)]);

    let restored = pollster::block_on(engine.restore_from_sink(&ImageCrateDecoder::new())).unwrap();
    assert!(!restored);
    assert!(engine.page().background().is_none());
    assert_eq!(engine.page().strokes.len(), 1);

    // Erasing the stroke leaves nothing behind.
    engine.set_tool(Tool::Eraser);
    engine.set_eraser_mode(EraserMode::Object);
    stylus(&mut engine, &[(160.0, 100.0)]);
    assert!(engine.page().strokes.is_empty());
    assert_eq!(engine.surface().pixel(160, 100), Some([0, 0, 0, 0]));
}

#[test]
fn test_script_replay_writes_pages() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("photo.png"), png_of(64, 32, [200, 100, 0])).unwrap();

    let script = Script::from_json(
        r##"{
            "config": { "pageSize": { "width": 400, "height": 300 } },
            "steps": [
                { "op": "pointer", "phase": "down", "position": { "x": 10, "y": 10 }, "kind": "stylus" },
                { "op": "pointer", "phase": "move", "position": { "x": 90, "y": 40 }, "kind": "stylus" },
                { "op": "pointer", "phase": "up", "position": { "x": 90, "y": 40 }, "kind": "stylus" },
                { "op": "insertImage", "path": "photo.png" },
                { "op": "insertImage", "path": "missing.png" },
                { "op": "nextPage" },
                { "op": "setColor", "color": "#3B82F6" },
                { "op": "pointer", "phase": "down", "position": { "x": 50, "y": 50 }, "kind": "pen" },
                { "op": "pointer", "phase": "leave", "position": { "x": 50, "y": 50 }, "kind": "pen" }
            ]
        }"##,
    )
    .unwrap();

    let out = dir.path().join("out");
    let sink = FileSink::new(out.clone()).unwrap();
    let mut engine = Engine::new(script.config.clone().unwrap(), Box::new(sink)).unwrap();
    let summary = pollster::block_on(run_script(
        &mut engine,
        &script,
        &ImageCrateDecoder::new(),
        dir.path(),
    ));

    assert_eq!(summary.steps, 9);
    assert_eq!(summary.failed_loads, 1);
    assert_eq!(engine.page_count(), 2);
    assert_eq!(engine.notebook().page(0).map(|p| p.images.len()), Some(1));
    assert!(out.join("page-0.png").exists());
    assert!(out.join("page-1.png").exists());

    let page_zero = decode_bytes(&std::fs::read(out.join("page-0.png")).unwrap()).unwrap();
    assert_eq!((page_zero.width(), page_zero.height()), (400, 300));
}

use glam::DVec2;
use tilecast::debug::DebugPath;
use tilecast::map::{Cell, TileGrid};
use tilecast::render::{PLAYER_RADIUS, TRACE_RADIUS};
use tilecast::{
    Axis, Color, DrawCommand, Frame, Palette, Pose, RenderError, Renderer, Scene, Viewport,
    Viewports,
};

const DARK_RED: Color = Color::rgb(0x8b, 0, 0);

fn lines(frame: &[DrawCommand]) -> Vec<(DVec2, DVec2, Color)> {
    frame
        .iter()
        .filter_map(|cmd| match *cmd {
            DrawCommand::Line { from, to, color } => Some((from, to, color)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_reference_frame_layout() {
    let frame = tilecast::render(Scene::reference()).unwrap();
    // 3 outlines, 30 cells, player, 4 crossings, trace line, 3 segments per column
    assert_eq!(frame.len(), 3 + 30 + 1 + 4 + 1 + 370 * 3);

    assert!(frame[..3]
        .iter()
        .all(|cmd| matches!(cmd, DrawCommand::Rect { filled: false, .. })));
    assert!(frame[3..33]
        .iter()
        .all(|cmd| matches!(cmd, DrawCommand::Rect { filled: true, .. })));

    match frame[33] {
        DrawCommand::Circle {
            center,
            radius,
            color,
        } => {
            assert!((center - DVec2::new(-287.5, -66.)).length() < 1e-9);
            assert_eq!(radius, PLAYER_RADIUS);
            assert_eq!(color, Color::RED);
        }
        other => panic!("expected the player marker, got {other:?}"),
    }
}

#[test]
fn test_map_cells_use_palette() {
    let frame = tilecast::render(Scene::reference()).unwrap();
    let palette = Palette::default();
    // row 2, col 0 is a red wall
    match frame[3 + 2 * 6] {
        DrawCommand::Rect {
            top_left,
            bottom_right,
            color,
            ..
        } => {
            assert_eq!(color, palette.tile(2).unwrap());
            assert!((top_left - DVec2::new(-380., 18.)).length() < 1e-9);
            assert!((bottom_right - DVec2::new(-380. + 370. / 6., -38.)).length() < 1e-9);
        }
        other => panic!("expected a cell, got {other:?}"),
    }
}

#[test]
fn test_columns_stay_in_view() {
    let scene = Scene::reference();
    let view = scene.viewports.view;
    let frame = tilecast::render(scene).unwrap();
    let all = lines(&frame);
    let columns = &all[1..];
    assert_eq!(columns.len(), 370 * 3);

    for (i, segments) in columns.chunks(3).enumerate() {
        let x = view.left + i as f64;
        for (from, to, _) in segments {
            assert_eq!(from.x, x);
            assert_eq!(to.x, x);
            for y in [from.y, to.y] {
                assert!(y <= view.top && y >= view.bottom(), "column {i} leaves view");
            }
        }
        // ceiling, wall and floor join up from top to bottom
        assert_eq!(segments[0].0.y, view.top);
        assert_eq!(segments[0].1.y, segments[1].0.y);
        assert_eq!(segments[1].1.y, segments[2].0.y);
        assert_eq!(segments[2].1.y, view.bottom());
    }
}

#[test]
fn test_close_wall_fills_first_column() {
    let frame = tilecast::render(Scene::reference()).unwrap();
    let all = lines(&frame);
    let columns = &all[1..];
    let palette = Palette::default();

    let (ceiling, wall, floor) = (columns[0], columns[1], columns[2]);
    assert_eq!(ceiling.2, palette.ceiling);
    assert_eq!(wall.2, DARK_RED);
    assert_eq!(floor.2, palette.floor);
    // depth 0.366 puts both wall ends past the view bounds
    assert_eq!(wall.0.y, 130.);
    assert_eq!(wall.1.y, -150.);
}

#[test]
fn test_far_wall_projection() {
    let frame = tilecast::render(Scene::reference()).unwrap();
    let all = lines(&frame);
    let columns = &all[1..];
    let wall = columns[185 * 3 + 1];
    let depth = 2.886751345948128;
    assert!((wall.0.y - 54. / depth).abs() < 1e-6);
    assert!((wall.1.y - -74. / depth).abs() < 1e-6);
}

#[test]
fn test_frame_carries_its_column_hits() {
    let renderer = Renderer::new(Scene::reference()).unwrap();
    let Frame { commands, hits } = renderer.render_frame();
    assert_eq!(commands, renderer.render());
    assert_eq!(hits, renderer.cast_columns());
    assert_eq!(hits.len(), renderer.columns());
}

#[test]
fn test_rendering_is_repeatable() {
    let renderer = Renderer::new(Scene::reference()).unwrap();
    assert_eq!(renderer.render(), renderer.render());
}

#[test]
fn test_debug_trace() {
    let renderer = Renderer::new(Scene::reference()).unwrap();
    let pose = renderer.scene().pose;
    let path = DebugPath::trace(&renderer.raycaster(), &pose);

    assert_eq!(path.crossings.len(), 4);
    let hit = path.hit.unwrap();
    assert_eq!(hit.cell, Cell::new(2, 4));
    assert_eq!(hit.axis, Axis::X);

    // the trace ends where the center column's ray hits
    assert_eq!(hit, renderer.cast_columns()[185]);
    let end = path.end().unwrap();
    let expected = pose.position + pose.forward() * hit.distance;
    assert!((end - expected).length() < 1e-9);
    // struck on the grid line between columns 3 and 4
    assert!((end.x - 4.).abs() < 1e-9);

    let mut out = Vec::new();
    path.draw(renderer.scene(), &mut out);
    assert_eq!(out.len(), 5);
    assert!(out[..4].iter().all(|cmd| matches!(
        cmd,
        DrawCommand::Circle { radius, .. } if *radius == TRACE_RADIUS
    )));
    assert!(matches!(out[4], DrawCommand::Line { .. }));
}

#[test]
fn test_stuck_rays_do_not_abort_the_frame() {
    let scene = Scene {
        max_steps: 1,
        ..Scene::reference()
    };
    let renderer = Renderer::new(scene).unwrap();
    let hits = renderer.cast_columns();
    assert_eq!(hits.len(), 370);
    // the first column hits on its first crossing, the center one needs four
    assert_eq!(hits[0].tile, 2);
    assert!(hits[185].is_boundary());
    assert_eq!(hits[185].distance, tilecast::ray::MAX_DEPTH);
    // its only crossing was the column line into (3, 2)
    assert_eq!(hits[185].axis, Axis::X);
    assert_eq!(hits[185].cell, Cell::new(3, 2));

    // the debug ray times out too: one dot and no line
    let frame = renderer.render();
    assert_eq!(frame.len(), 3 + 30 + 1 + 1 + 370 * 3);
}

#[test]
fn test_open_map_renders_void_walls() {
    let grid = TileGrid::new(vec![vec![0, 0, 0], vec![0, 0, 0]]).unwrap();
    let mut palette = Palette::default();
    palette.void = Color::rgb(1, 2, 3);
    let scene = Scene::configure(grid, Pose::new(1.5, 1.5, 0.), Viewports::default(), palette)
        .unwrap();
    let frame = tilecast::render(scene).unwrap();
    let all = lines(&frame);
    let columns = &all[1..];
    assert!(columns
        .chunks(3)
        .all(|segments| segments[1].2 == Color::rgb(1, 2, 3)));
}

#[test]
fn test_configuration_errors() {
    let bad_view = Scene {
        viewports: Viewports {
            view: Viewport::new(10., 130., 0., 280.),
            ..Viewports::default()
        },
        ..Scene::reference()
    };
    assert!(matches!(
        tilecast::render(bad_view),
        Err(RenderError::Configuration(_))
    ));

    let outside = Scene {
        pose: Pose::new(5.5, 1.5, 0.),
        ..Scene::reference()
    };
    assert!(matches!(
        Renderer::new(outside),
        Err(RenderError::Configuration(_))
    ));

    let nan = Scene {
        pose: Pose::new(1.5, 1.5, f64::NAN),
        ..Scene::reference()
    };
    assert!(Renderer::new(nan).is_err());

    let mut sliver = Scene::reference();
    sliver.viewports.view.width = 0.5;
    let err = tilecast::render(sliver).unwrap_err();
    assert!(err.to_string().contains("narrower than one column"));

    let mut no_screen = Scene::reference();
    no_screen.viewports.screen = (800, 0);
    assert!(matches!(
        Renderer::new(no_screen),
        Err(RenderError::Configuration(_))
    ));

    let uncolored = TileGrid::new(vec![vec![1, 9], vec![1, 0]]).unwrap();
    let err = Scene::configure(
        uncolored,
        Pose::new(1.5, 1.5, 0.),
        Viewports::default(),
        Palette::default(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("tile 9"));

    assert!(matches!(
        TileGrid::new(vec![vec![1, 1, 1], vec![1, 0]]),
        Err(RenderError::Configuration(_))
    ));
}

#[test]
fn test_side_shading_is_opt_in() {
    let mut scene = Scene::reference();
    scene.palette.side_shade = 0.5;
    let frame = tilecast::render(scene).unwrap();
    let all = lines(&frame);
    let columns = &all[1..];
    // column 0 is a Y hit on a red wall, column 185 an X hit
    assert_eq!(columns[1].2, DARK_RED.shade(0.5));
    assert_eq!(columns[185 * 3 + 1].2, DARK_RED);
}

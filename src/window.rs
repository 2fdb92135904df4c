use anyhow::Context;
use glam::DVec2;
use sdl2::event::Event;
use sdl2::pixels::Color;
use sdl2::rect::{Point, Rect};
use sdl2::render::Canvas;
use sdl2::video::Window;
use std::time::{Duration, Instant};
use tilecast::DrawCommand;

const TARGET_FPS: u64 = 30;

// helper trait to convert strings into std::error types
trait StringToAnyhow<T> {
    fn ah(self) -> anyhow::Result<T>;
}

impl<T> StringToAnyhow<T> for Result<T, String> {
    fn ah(self) -> anyhow::Result<T> {
        self.map_err(|err| anyhow::anyhow!("{err}"))
    }
}

/// Converts the centred, y-up scene space into SDL's top-left, y-down space.
struct Screen {
    half: DVec2,
}

impl Screen {
    fn point(&self, p: DVec2) -> Point {
        Point::new(
            (p.x + self.half.x).round() as i32,
            (self.half.y - p.y).round() as i32,
        )
    }
}

fn sdl_color(color: tilecast::Color) -> Color {
    Color::RGB(color.r, color.g, color.b)
}

fn draw(canvas: &mut Canvas<Window>, screen: &Screen, cmd: &DrawCommand) -> anyhow::Result<()> {
    match *cmd {
        DrawCommand::Rect {
            top_left,
            bottom_right,
            color,
            filled,
        } => {
            let corner = screen.point(top_left);
            let size = screen.point(bottom_right) - corner;
            let rect = Rect::new(
                corner.x(),
                corner.y(),
                size.x().max(1) as u32,
                size.y().max(1) as u32,
            );
            canvas.set_draw_color(sdl_color(color));
            if filled {
                canvas.fill_rect(rect).ah()?;
            } else {
                canvas.draw_rect(rect).ah()?;
            }
        }
        DrawCommand::Circle {
            center,
            radius,
            color,
        } => {
            canvas.set_draw_color(sdl_color(color));
            // filled with one horizontal line per scanline
            let r = radius.round() as i32;
            for dy in -r..=r {
                let half = (radius * radius - (dy * dy) as f64).max(0.).sqrt();
                let y = center.y + dy as f64;
                canvas
                    .draw_line(
                        screen.point(DVec2::new(center.x - half, y)),
                        screen.point(DVec2::new(center.x + half, y)),
                    )
                    .ah()?;
            }
        }
        DrawCommand::Line { from, to, color } => {
            canvas.set_draw_color(sdl_color(color));
            canvas
                .draw_line(screen.point(from), screen.point(to))
                .ah()?;
        }
    }

    Ok(())
}

/// Show `frame` in a window until it is closed.
pub fn present(frame: &[DrawCommand], (width, height): (u32, u32)) -> anyhow::Result<()> {
    // sdl boilerplate
    log::info!("initializing sdl2");
    let sdl_ctx = sdl2::init().ah()?;
    log::info!("initializing video");
    let video = sdl_ctx.video().ah()?;

    log::info!("initializing window");
    let mut window = video
        .window("tilecast", width, height)
        .position_centered()
        .build()?;
    window.set_resizable(false);
    log::info!("creating canvas");
    let mut canvas = window
        .into_canvas()
        .build()
        .context("could not create canvas")?;
    let mut events = sdl_ctx.event_pump().ah()?;

    let screen = Screen {
        half: DVec2::new(width as f64, height as f64) / 2.,
    };
    let delta = Duration::from_millis(1_000 / TARGET_FPS);
    let mut dirty = true;

    'main_loop: loop {
        let prev = Instant::now();

        for ev in events.poll_iter() {
            match ev {
                Event::Quit { .. } => break 'main_loop,
                Event::Window { .. } => dirty = true,
                _ => {}
            }
        }

        if dirty {
            canvas.set_draw_color(Color::WHITE);
            canvas.clear();
            for cmd in frame {
                draw(&mut canvas, &screen, cmd)?;
            }
            canvas.present();
            dirty = false;
        }

        let diff = Instant::now() - prev;
        if diff < delta {
            std::thread::sleep(delta - diff);
        }
    }

    Ok(())
}

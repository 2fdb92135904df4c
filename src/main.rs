use std::path::PathBuf;
use tilecast::{Frame, Renderer, Scene};

#[cfg(feature = "window")]
mod window;

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init_custom_env("TILECAST_LOG");

    let scene = match std::env::args_os().nth(1) {
        Some(path) => Scene::load(PathBuf::from(path))?,
        None => {
            log::info!("no scene given, using the reference scene");
            Scene::reference()
        }
    };

    let renderer = Renderer::new(scene)?;
    let Frame { commands, hits } = renderer.render_frame();
    let boundary = hits.iter().filter(|hit| hit.is_boundary()).count();
    log::info!(
        "{} columns cast, {boundary} reached the map edge, {} draw commands",
        hits.len(),
        commands.len()
    );

    #[cfg(feature = "window")]
    window::present(&commands, renderer.scene().viewports.screen)?;

    #[cfg(not(feature = "window"))]
    {
        use std::io::Write;

        let mut out = std::io::BufWriter::new(std::io::stdout().lock());
        for cmd in &commands {
            writeln!(out, "{cmd}")?;
        }
        out.flush()?;
    }

    Ok(())
}

use crate::error::{RenderError, Result};
use crate::map::{TileGrid, TileId};
use crate::ray::{Pose, DEFAULT_MAX_STEPS};
use crate::render::{Color, Palette};
use crate::viewport::Viewport;
use anyhow::Context;
use std::collections::HashMap;
use std::fs::read_to_string;
use std::ops::ControlFlow;
use std::path::PathBuf;

fn parse_hex_color(hex: &str) -> anyhow::Result<Color> {
    if hex.len() != 7 || !hex.is_ascii() || !hex.starts_with('#') {
        anyhow::bail!("not a hex string: {hex}");
    }

    let r = u8::from_str_radix(&hex[1..=2], 16)?;
    let g = u8::from_str_radix(&hex[3..=4], 16)?;
    let b = u8::from_str_radix(&hex[5..=6], 16)?;

    Ok(Color::rgb(r, g, b))
}

/// Pixel-space panels of the screen. Pixel space is centred on the screen, y up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewports {
    pub screen: (u32, u32),
    pub title: Viewport,
    pub map: Viewport,
    pub view: Viewport,
}

impl Default for Viewports {
    fn default() -> Self {
        Self {
            screen: (800, 400),
            title: Viewport::from_corners((-300., 170.), (300., 150.)),
            map: Viewport::from_corners((-380., 130.), (-10., -150.)),
            view: Viewport::from_corners((10., 130.), (380., -150.)),
        }
    }
}

/// Everything a render pass reads.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub grid: TileGrid,
    pub pose: Pose,
    pub viewports: Viewports,
    pub palette: Palette,
    /// Ceiling on grid line crossings per ray.
    pub max_steps: usize,
}

fn reference_grid() -> Vec<Vec<TileId>> {
    vec![
        vec![1, 1, 1, 1, 1, 1],
        vec![1, 0, 0, 0, 0, 2],
        vec![2, 2, 0, 0, 2, 2],
        vec![1, 0, 0, 0, 0, 2],
        vec![1, 1, 1, 1, 1, 1],
    ]
}

impl Scene {
    /// Build and validate a scene.
    pub fn configure(
        grid: TileGrid,
        pose: Pose,
        viewports: Viewports,
        palette: Palette,
    ) -> Result<Self> {
        let scene = Self {
            grid,
            pose,
            viewports,
            palette,
            max_steps: DEFAULT_MAX_STEPS,
        };
        scene.validate()?;
        Ok(scene)
    }

    /// The 5x6 demo room, seen from row 3.5, column 1.5 facing 30°.
    pub fn reference() -> Self {
        Self {
            grid: TileGrid::new(reference_grid()).expect("reference grid is rectangular"),
            pose: Pose::new(3.5, 1.5, 30.),
            viewports: Viewports::default(),
            palette: Palette::default(),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.viewports.title.validate("title")?;
        self.viewports.map.validate("map")?;
        self.viewports.view.validate("view")?;
        if self.viewports.view.width < 1. {
            return Err(RenderError::config(format!(
                "view is {} px wide, narrower than one column",
                self.viewports.view.width
            )));
        }
        if let (0, _) | (_, 0) = self.viewports.screen {
            return Err(RenderError::config(format!(
                "screen has no area ({} x {})",
                self.viewports.screen.0, self.viewports.screen.1
            )));
        }

        if self.max_steps == 0 {
            return Err(RenderError::config("max_steps must be at least 1"));
        }

        let Pose { position, angle } = self.pose;
        if !position.is_finite() || !angle.is_finite() {
            return Err(RenderError::config("pose is not finite"));
        }
        let rows = 0. ..self.grid.rows() as f64;
        let cols = 0. ..self.grid.cols() as f64;
        if !rows.contains(&self.pose.row()) || !cols.contains(&self.pose.col()) {
            return Err(RenderError::config(format!(
                "pose ({}, {}) is outside the {}x{} grid",
                self.pose.row(),
                self.pose.col(),
                self.grid.rows(),
                self.grid.cols()
            )));
        }

        if let Some((cell, tile)) = self
            .grid
            .cells()
            .find(|(_, tile)| self.palette.tile(*tile).is_none())
        {
            return Err(RenderError::config(format!(
                "tile {tile} at ({}, {}) has no color",
                cell.row, cell.col
            )));
        }

        Ok(())
    }

    pub fn load(name: PathBuf) -> anyhow::Result<Self> {
        log::info!("loading scene at {}", name.display());
        let file = read_to_string(&name)
            .with_context(|| format!("could not read {}", name.display()))?;
        Self::parse(&file)
    }

    /// Parse a scene file. Sections start with a `!!!!` directive line and end at a blank
    /// line; anything not given keeps the reference value.
    pub fn parse(src: &str) -> anyhow::Result<Self> {
        let mut this = Self::reference();
        let mut lines = src.lines();

        while let Some(line) = lines.by_ref().next() {
            match line {
                "!!!!META" => this.parse_meta(&mut lines)?,
                "!!!!PALETTE" => this.parse_palette(&mut lines)?,
                "!!!!MAIN" => this.parse_main(&mut lines)?,
                "" => {}
                other => anyhow::bail!("unrecognized directive: {other}"),
            }
        }

        this.validate()?;
        Ok(this)
    }

    fn parse_meta<'lines>(
        &mut self,
        mut lines: impl Iterator<Item = &'lines str>,
    ) -> anyhow::Result<()> {
        for line in lines.by_ref() {
            if line.is_empty() {
                break;
            }

            let mut chunks = line.split(',');
            let directive = chunks.by_ref().next().unwrap_or_default();
            let params = chunks
                .map(|param| param.split_once('='))
                .collect::<Option<HashMap<_, _>>>()
                .context("incorrectly formatted meta")?;
            let num = |key: &str| -> anyhow::Result<f64> {
                params
                    .get(key)
                    .with_context(|| format!("{directive} is missing {key}"))?
                    .parse()
                    .with_context(|| format!("{directive}.{key} is not a number"))
            };
            let pixels = |key: &str| -> anyhow::Result<u32> {
                let value = num(key)?;
                if !(1. ..=u32::MAX as f64).contains(&value) {
                    anyhow::bail!("{directive}.{key} must be a positive pixel count, got {value}");
                }
                Ok(value as u32)
            };

            match directive {
                "pose" => self.pose = Pose::new(num("row")?, num("col")?, num("angle")?),
                "screen" => self.viewports.screen = (pixels("width")?, pixels("height")?),
                "title" | "map" | "view" => {
                    let vp = Viewport::from_corners(
                        (num("left")?, num("top")?),
                        (num("right")?, num("bottom")?),
                    );
                    match directive {
                        "title" => self.viewports.title = vp,
                        "map" => self.viewports.map = vp,
                        _ => self.viewports.view = vp,
                    }
                }
                "raycast" => {
                    if let Some(steps) = params.get("max_steps") {
                        self.max_steps = steps.parse().context("max_steps is not a count")?;
                    }
                }
                other => anyhow::bail!("unrecognized meta directive: {other}"),
            }
        }

        Ok(())
    }

    fn parse_palette<'lines>(
        &mut self,
        mut lines: impl Iterator<Item = &'lines str>,
    ) -> anyhow::Result<()> {
        for line in lines.by_ref() {
            if line.is_empty() {
                break;
            }

            let (key, value) = line
                .split_once('=')
                .with_context(|| format!("incorrectly formatted palette entry: {line}"))?;
            if key == "side_shade" {
                self.palette.side_shade = value.parse().context("side_shade is not a number")?;
                continue;
            }

            let color = parse_hex_color(value)?;
            match key {
                "ceiling" => self.palette.ceiling = color,
                "floor" => self.palette.floor = color,
                "player" => self.palette.player = color,
                "trace" => self.palette.trace = color,
                "outline" => self.palette.outline = color,
                "void" => self.palette.void = color,
                tile => {
                    let id = tile
                        .parse::<TileId>()
                        .ok()
                        .filter(|id| *id < 10)
                        .with_context(|| format!("invalid palette key: {tile}"))?;
                    self.palette.set_tile(id, color);
                }
            }
        }

        Ok(())
    }

    fn parse_main<'lines>(
        &mut self,
        mut lines: impl Iterator<Item = &'lines str>,
    ) -> anyhow::Result<()> {
        let mut rows = vec![];
        let mut error = None;

        lines.by_ref().try_for_each(|s| {
            if s.is_empty() {
                return ControlFlow::Break(());
            }

            match s
                .chars()
                .map(|tile| tile.to_digit(10).map(|id| id as TileId))
                .collect::<Option<Vec<_>>>()
            {
                Some(row) => {
                    rows.push(row);
                    ControlFlow::Continue(())
                }
                None => {
                    error = Some(s.to_owned());
                    ControlFlow::Break(())
                }
            }
        });

        if let Some(line) = error {
            anyhow::bail!("invalid tile in map row: {line}");
        }

        self.grid = TileGrid::new(rows)?;
        Ok(())
    }
}

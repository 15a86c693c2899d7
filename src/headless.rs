use crate::{
    app::App,
    cli::Arguments,
    config::AppConfig,
    input::{InputState, BUTTON_PRIMARY},
    ui::{CanvasMode, UiState},
};
use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod context;

pub use context::{init, HeadlessBinding, HeadlessContext, WgslShader, SHADER_SOURCE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayMetadata {
    #[serde(default = "ReplayMetadata::default_size")]
    pub size: [u32; 2],
    /// App config to use instead of the embedded one, relative to the script
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ReplayFrame {
    /// Primary button clicks in canvas pixels
    #[serde(default)]
    pub clicks: Vec<[f64; 2]>,
    #[serde(default)]
    pub clear: bool,
}

/// Replay script for headless rendering, in TOML
/// [replay] sets the canvas size and an optional app config
/// Each [[frame]] lists the clicks to apply and whether the canvas is cleared.
/// A frame with several clicks runs one app update per click, the clear flag
/// is applied on the last of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayScript {
    pub replay: ReplayMetadata,
    #[serde(rename = "frame", default)]
    pub frames: Vec<ReplayFrame>,
}

impl ReplayMetadata {
    fn default_size() -> [u32; 2] {
        [640, 480]
    }
}

impl ReplayScript {
    pub fn new(data: impl AsRef<str>) -> anyhow::Result<Self> {
        toml::from_str(data.as_ref()).map_err(|err| anyhow::anyhow!("ReplayScript::new: {}", err))
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let data = std::fs::read_to_string(path)
            .map_err(|err| anyhow::anyhow!("ReplayScript::from_file: failed to read file: {}", err))?;
        Self::new(data)
    }

    /// Canvas size after applying the command line overrides
    pub fn size(&self, overrides: (Option<u32>, Option<u32>)) -> (u32, u32) {
        let [width, height] = self.replay.size;
        (
            overrides.0.unwrap_or(width).max(1),
            overrides.1.unwrap_or(height).max(1),
        )
    }

    /// Input and UI state of every app update, in order
    pub fn steps(&self) -> Vec<(InputState, UiState)> {
        let mut steps = vec![];

        for frame in &self.frames {
            let ui = |last: bool| UiState {
                canvas: if frame.clear && last {
                    CanvasMode::Clear
                } else {
                    CanvasMode::Draw
                },
            };

            if frame.clicks.is_empty() {
                steps.push((InputState::new(), ui(true)));
                continue;
            }

            for (idx, [x, y]) in frame.clicks.iter().copied().enumerate() {
                let mut input = InputState::new();
                input.pointer_moved(x, y);
                input.button_pressed(BUTTON_PRIMARY);
                input.button_released(BUTTON_PRIMARY);
                steps.push((input, ui(idx + 1 == frame.clicks.len())));
            }
        }

        steps
    }
}

fn load_config(script: &ReplayScript, script_path: &Path) -> anyhow::Result<AppConfig> {
    match &script.replay.config {
        Some(path) => {
            let path = script_path
                .parent()
                .map(|dir| dir.join(path))
                .unwrap_or_else(|| path.clone());
            log::debug!("shapegl::headless::load_config: loading {}", path.display());
            AppConfig::from_file(path)
        }
        None => AppConfig::embedded(),
    }
}

/// Replay `args.script` offscreen and write the final frame to `args.output`
pub async fn run(args: Arguments) -> anyhow::Result<()> {
    let script = ReplayScript::from_file(&args.script)
        .with_context(|| format!("shapegl::headless::run: reading {}", args.script.display()))?;
    let config = load_config(&script, &args.script)?;
    let size = script.size(args.size);

    let mut ctx = init(size).await?;
    let shader = WgslShader::new(&ctx, SHADER_SOURCE);
    let mut app = App::new(&config, shader, size)?;

    let steps = script.steps();
    log::info!(
        "shapegl::headless::run: replaying {} frames ({} updates) at {}x{}",
        script.frames.len(),
        steps.len(),
        size.0,
        size.1
    );

    for (mut input, ui) in steps {
        if let Err(e) = app.update(&mut ctx, &mut input, &ui, size) {
            log::warn!("shapegl::headless::run: frame {}: {e}", app.frame_count());
        }
        ctx.submit();
    }

    // an empty script still produces the background
    if app.frame_count() == 0 {
        app.render(&mut ctx, size)?;
        ctx.submit();
    }

    let pixels = ctx.read_pixels().await?;
    let (width, height) = ctx.size();
    let image = image::RgbaImage::from_raw(width, height, pixels)
        .context("shapegl::headless::run: readback size does not match the target")?;
    image
        .save(&args.output)
        .with_context(|| format!("shapegl::headless::run: writing {}", args.output.display()))?;

    log::info!(
        "shapegl::headless::run: wrote {} with {} shapes",
        args.output.display(),
        app.scene().len()
    );
    Ok(())
}

use clap::Parser;
use embedded_graphics::pixelcolor::{Rgb565, RgbColor};
use log::{error, info, warn};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use skywatch::{
  config::read_config,
  ingest::{AlwaysUp, Source},
  manager::Manager,
  render::{
    sprite::SpriteAtlas,
    surface::{BackgroundImage, FrameBuffer},
  },
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug)]
struct Args {
  #[arg(short)]
  config: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  let args = Args::parse();
  let config = read_config(args.config.as_deref());

  TermLogger::init(
    config.log.level,
    Config::default(),
    TerminalMode::Stdout,
    ColorChoice::Always,
  )?;

  info!("starting skywatch version {}", VERSION);
  config.validate()?;
  let layout = config.layout();

  let background = match &config.map.background {
    Some(path) => BackgroundImage::load(path, layout.screen).unwrap_or_else(|err| {
      warn!("error loading background {path}: {err}, using a blank map");
      BackgroundImage::solid(layout.screen, Rgb565::BLACK)
    }),
    None => BackgroundImage::solid(layout.screen, Rgb565::BLACK),
  };

  let atlas = match &config.sprite.atlas {
    Some(path) => SpriteAtlas::load(path, layout.sprite).unwrap_or_else(|err| {
      warn!("error loading sprite atlas {path}: {err}, using generated sprites");
      SpriteAtlas::generated(layout.sprite)
    }),
    None => SpriteAtlas::generated(layout.sprite),
  };

  let surface = match &config.display.snapshot {
    Some(path) => FrameBuffer::with_snapshot(layout.screen, path),
    None => FrameBuffer::new(layout.screen),
  };

  let source = Source::new(&config.api)?;
  let mut m = Manager::new(config, surface, background, atlas, AlwaysUp);

  tokio::select! {
    res = m.run(&source) => {
      if let Err(err) = res {
        error!("error running manager: {err:?}");
      }
    }
    _ = tokio::signal::ctrl_c() => {
      info!("interrupted, shutting down");
    }
  }
  Ok(())
}

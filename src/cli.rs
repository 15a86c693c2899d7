use clap::{crate_version, Args, Command, FromArgMatches};
use std::{num::NonZeroU32, path::PathBuf};

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Arguments {
    pub script: PathBuf,
    pub output: PathBuf,
    pub size: (Option<u32>, Option<u32>),
}

#[derive(Args)]
#[clap(version, long_about = None)]
struct MyArgs {
    /// Replay script (TOML) describing the clicks of every frame
    #[clap(long, short)]
    render: PathBuf,
    /// PNG file to write the last frame to
    #[clap(long, short)]
    output: PathBuf,
    /// Override the width from the replay script
    #[clap(long, short = 'W')]
    width: Option<NonZeroU32>,
    /// Override the height from the replay script
    #[clap(long, short = 'H')]
    height: Option<NonZeroU32>,
}

impl From<MyArgs> for Arguments {
    fn from(args: MyArgs) -> Self {
        Self {
            script: args.render,
            output: args.output,
            size: (args.width.map(u32::from), args.height.map(u32::from)),
        }
    }
}

pub fn parse_cli() -> Arguments {
    let matches = command().get_matches();
    // clap already exited on invalid input
    MyArgs::from_arg_matches(&matches)
        .map(Arguments::from)
        .unwrap_or_else(|e| e.exit())
}

pub fn command() -> Command {
    MyArgs::augment_args(
        Command::new(env!("CARGO_PKG_NAME"))
            .bin_name(env!("CARGO_PKG_NAME"))
            .version(crate_version!())
            .about("Replay clicks against the triangle scene and save the last frame as PNG"),
    )
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(args: &[&str]) -> Result<Arguments, clap::Error> {
        let matches = command().try_get_matches_from(args)?;
        MyArgs::from_arg_matches(&matches).map(Arguments::from)
    }

    #[test]
    fn render_and_output() {
        let args = parse(&["shapegl", "--render", "in.toml", "-o", "out.png"]).unwrap();

        assert_eq!(
            Arguments {
                script: PathBuf::from("in.toml"),
                output: PathBuf::from("out.png"),
                size: (None, None),
            },
            args
        );
    }

    #[test]
    fn size_overrides() {
        let args = parse(&["shapegl", "-r", "in.toml", "-o", "out.png", "-W", "320", "-H", "200"])
            .unwrap();

        assert_eq!((Some(320), Some(200)), args.size);
    }

    #[test]
    fn output_is_required() {
        assert!(parse(&["shapegl", "--render", "in.toml"]).is_err());
    }

    #[test]
    fn zero_width_is_rejected() {
        assert!(parse(&["shapegl", "-r", "in.toml", "-o", "out.png", "-W", "0"]).is_err());
    }
}

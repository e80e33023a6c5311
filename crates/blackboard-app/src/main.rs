//! Command-line entry point (native).
//!
//! Loads a board (a document file, or the last autosave), then renders it to
//! SVG and/or exports it.
//!
//! ```text
//! blackboard [--config app.json] [--svg out.svg] [--export out.json] [--shortcuts] [board.json]
//! ```

#[cfg(feature = "native")]
fn main() {
    use clap::Parser;

    env_logger::init();
    log::info!("Starting Blackboard");

    let cli = cli::Cli::parse();
    if let Err(e) = cli::run(&cli) {
        log::error!("{}", e);
        eprintln!("blackboard: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}

#[cfg(feature = "native")]
mod cli {
    use blackboard_app::{AppConfig, Session, ShortcutRegistry, platform_clipboard};
    use blackboard_core::storage::FileStorage;
    use clap::Parser;
    use std::error::Error;
    use std::path::PathBuf;
    use std::sync::Arc;

    /// Render or export a Blackboard board.
    #[derive(Debug, Parser)]
    #[command(name = "blackboard", version, about)]
    pub struct Cli {
        /// App config file (JSON)
        #[arg(long, env = "BLACKBOARD_CONFIG")]
        pub config: Option<PathBuf>,

        /// Write the board as SVG
        #[arg(long, value_name = "PATH")]
        pub svg: Option<PathBuf>,

        /// Write the board as a document file
        #[arg(long, value_name = "PATH")]
        pub export: Option<PathBuf>,

        /// Print keyboard shortcuts
        #[arg(long)]
        pub shortcuts: bool,

        /// Board document to load instead of the autosave
        pub input: Option<PathBuf>,
    }

    pub fn run(options: &Cli) -> Result<(), Box<dyn Error>> {
        if options.shortcuts {
            ShortcutRegistry::print_all();
        }

        let config = match &options.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };
        let storage = match &config.storage_dir {
            Some(dir) => FileStorage::new(dir.clone())?,
            None => FileStorage::default_location()?,
        };
        let mut session = Session::new(config, Arc::new(storage), platform_clipboard());

        let count = match &options.input {
            Some(path) => session.import_document(path)?,
            None => session.restore()?.unwrap_or(0),
        };
        log::info!("Board has {} elements", count);

        if let Some(path) = &options.svg {
            std::fs::write(path, session.render_svg())?;
            log::info!("Rendered board to {}", path.display());
        }
        if let Some(path) = &options.export {
            session.export_document(path)?;
        }
        if session.autosave().is_dirty() {
            session.save_now()?;
        }
        if options.svg.is_none() && options.export.is_none() {
            println!("{} elements", count);
        }
        Ok(())
    }

}

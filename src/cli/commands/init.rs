//! `rateq init` command - Initialize a new rate book project

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::GlobalOpts;
use crate::core::project::{Project, ProjectError};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Overwrite the sample files even if .rateq/ already exists
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, global: &GlobalOpts) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        if !global.quiet {
            println!(
                "{} Created directory {}",
                style("✓").green(),
                style(path.display()).cyan()
            );
        }
    }

    let project = if args.force {
        Project::init_force(&path)
    } else {
        Project::init(&path)
    };

    match project {
        Ok(project) => {
            println!(
                "{} Initialized rate book at {}",
                style("✓").green(),
                style(project.root().display()).cyan()
            );
            if global.quiet {
                return Ok(());
            }
            println!();
            println!("Created files:");
            print_structure(&project);
            println!();
            println!("Next steps:");
            println!(
                "  {} Replace the sample rates with your own",
                style("rateq import rates FILE --tier T1 --channel NAME").yellow()
            );
            println!(
                "  {} Quote a package",
                style("rateq quote --wh 91730 --zip 75001 -L 12 -W 10 -H 8 --weight 3").yellow()
            );
            println!("  {} Check the rate book", style("rateq validate").yellow());
            Ok(())
        }
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} rateq project already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!(
                "Use {} to restore the sample files",
                style("rateq init --force").yellow()
            );
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}

fn print_structure(project: &Project) {
    let mut files = vec![
        project.config_path(),
        project.warehouses_path(),
        project.channels_path(),
        project.compliance_path(),
        project.zones_path(),
    ];
    files.extend(project.iter_rate_files());

    for file in files.iter().filter(|f| f.exists()) {
        println!("  {}", style(project.relative(file)).dim());
    }
}

use archboard::assemble::{self, DiagramKind};
use archboard::config::Config;
use archboard::db::Database;
use archboard::filters::{self, FilterConfig};
use archboard::render::{self, RenderOptions};
use archboard::templates::{self, Tag};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "archboard")]
#[command(author, version, about = "Filtered Mermaid architecture diagrams for agentic RAG platforms")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate diagram text and print it to stdout
    Generate {
        /// Diagram to generate: architecture, agent, ds, complete
        #[arg(short = 't', long = "type", default_value = "architecture")]
        diagram_type: String,

        /// Start from a named preset instead of the all-enabled default
        #[arg(short, long)]
        preset: Option<String>,

        /// Enable a tag (repeatable)
        #[arg(long = "enable", value_name = "TAG")]
        enabled: Vec<String>,

        /// Disable a tag (repeatable)
        #[arg(long = "disable", value_name = "TAG")]
        disabled: Vec<String>,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render a diagram to a standalone HTML document
    Render {
        /// Diagram to render: architecture, agent, ds, complete
        #[arg(short = 't', long = "type", default_value = "architecture")]
        diagram_type: String,

        /// Start from a named preset instead of the all-enabled default
        #[arg(short, long)]
        preset: Option<String>,

        /// Enable a tag (repeatable)
        #[arg(long = "enable", value_name = "TAG")]
        enabled: Vec<String>,

        /// Disable a tag (repeatable)
        #[arg(long = "disable", value_name = "TAG")]
        disabled: Vec<String>,

        /// Render Mermaid text from a file instead ("-" for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Mermaid theme (overrides config)
        #[arg(long)]
        theme: Option<String>,

        /// Minimum diagram height in pixels (overrides config)
        #[arg(long)]
        height: Option<u32>,

        /// Output HTML file
        #[arg(short, long, default_value = "diagram.html")]
        output: PathBuf,
    },

    /// Print mermaid.ink / mermaid.live links for a diagram
    Preview {
        /// Diagram to preview: architecture, agent, ds, complete
        #[arg(short = 't', long = "type", default_value = "architecture")]
        diagram_type: String,

        /// Start from a named preset instead of the all-enabled default
        #[arg(short, long)]
        preset: Option<String>,

        /// Enable a tag (repeatable)
        #[arg(long = "enable", value_name = "TAG")]
        enabled: Vec<String>,

        /// Disable a tag (repeatable)
        #[arg(long = "disable", value_name = "TAG")]
        disabled: Vec<String>,

        /// Preview Mermaid text from a file instead ("-" for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// List filter presets and what they enable
    Presets,

    /// Browse the extra-diagram template catalog
    Templates {
        /// Show a single category (sequence, er, class, gantt, pie)
        #[arg(short, long)]
        category: Option<String>,

        /// Print the body of one template from the category
        #[arg(short, long, requires = "category")]
        name: Option<String>,
    },

    /// Start the diagram viewer server
    Serve {
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show recent usage history
    History {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// Generate shell completions
    Completion {
        /// Shell to generate for
        shell: Shell,
    },
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args.command) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Generate {
            diagram_type,
            preset,
            enabled,
            disabled,
            output,
        } => {
            let kind: DiagramKind = diagram_type.parse()?;
            let config = build_filters(preset.as_deref(), &enabled, &disabled)?;
            let text = assemble::assemble(kind, &config);

            match output {
                Some(path) => {
                    std::fs::write(&path, &text)?;
                    println!("{} {}", "Wrote".green(), path.display());
                }
                None => print!("{}", text),
            }
            Ok(())
        }

        Command::Render {
            diagram_type,
            preset,
            enabled,
            disabled,
            input,
            theme,
            height,
            output,
        } => {
            let text = diagram_text(&diagram_type, preset.as_deref(), &enabled, &disabled, input)?;

            let defaults = Config::load().render_options();
            let options = RenderOptions {
                theme: theme.unwrap_or(defaults.theme),
                height_px: height.unwrap_or(defaults.height_px),
            };

            let html = render::render_document(&text, &options);
            std::fs::write(&output, html)?;
            println!("{} {}", "Wrote".green(), output.display());
            Ok(())
        }

        Command::Preview {
            diagram_type,
            preset,
            enabled,
            disabled,
            input,
        } => {
            let text = diagram_text(&diagram_type, preset.as_deref(), &enabled, &disabled, input)?;
            let links = render::preview_links(&text);
            println!("{}  {}", "Image:".cyan().bold(), links.preview_url);
            println!("{}   {}", "Edit:".cyan().bold(), links.edit_url);
            Ok(())
        }

        Command::Presets => {
            for (name, config) in filters::all_presets() {
                let enabled: Vec<&str> = config.enabled_tags().iter().map(|t| t.as_str()).collect();
                let summary = if enabled.is_empty() {
                    "(none)".dimmed().to_string()
                } else {
                    enabled.join(", ")
                };
                println!("{:<12} {}", name.green().bold(), summary);
            }
            Ok(())
        }

        Command::Templates { category, name } => {
            match (category, name) {
                (None, _) => {
                    for cat in templates::CATALOG {
                        println!("{} {}", cat.name.green().bold(), cat.title.dimmed());
                        for entry in cat.templates {
                            println!("  {:<20} {}", entry.name, entry.description.dimmed());
                        }
                    }
                }
                (Some(cat_name), None) => {
                    let cat = templates::category(&cat_name)
                        .ok_or_else(|| format!("Unknown template category: {}", cat_name))?;
                    println!("{} {}", cat.name.green().bold(), cat.title.dimmed());
                    for entry in cat.templates {
                        println!("  {:<20} {}", entry.name, entry.description.dimmed());
                    }
                }
                (Some(cat_name), Some(tpl_name)) => {
                    let entry = templates::template(&cat_name, &tpl_name).ok_or_else(|| {
                        format!("Unknown template: {}/{}", cat_name, tpl_name)
                    })?;
                    print!("{}", entry.code);
                    if !entry.code.ends_with('\n') {
                        println!();
                    }
                }
            }
            Ok(())
        }

        Command::Serve { port } => {
            let port = port.unwrap_or_else(|| Config::load().server.port);
            archboard::serve::start_server(port)?;
            Ok(())
        }

        Command::History { limit } => {
            let db = Database::open()?;
            let events = db.recent_usage(limit)?;
            if events.is_empty() {
                println!("{}", "No usage history yet.".dimmed());
                return Ok(());
            }
            for event in events {
                let user = event.user_id.as_deref().unwrap_or("-");
                let details = event.details_json.as_deref().unwrap_or("");
                println!(
                    "{}  {:<10} {:<10} {}",
                    event.created_at.dimmed(),
                    event.action.green(),
                    user,
                    details.dimmed()
                );
            }
            Ok(())
        }

        Command::Completion { shell } => {
            let mut cmd = Args::command();
            clap_complete::generate(shell, &mut cmd, "archboard", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Build a filter config from an optional preset plus enable/disable flags.
fn build_filters(
    preset: Option<&str>,
    enabled: &[String],
    disabled: &[String],
) -> Result<FilterConfig, Box<dyn std::error::Error>> {
    let mut config = match preset {
        Some(name) => filters::preset(name)?,
        None => FilterConfig::new(),
    };
    for name in enabled {
        let tag: Tag = name.parse()?;
        config.set(tag, true);
    }
    for name in disabled {
        let tag: Tag = name.parse()?;
        config.set(tag, false);
    }
    Ok(config)
}

/// Resolve the Mermaid text for render/preview: from a file, stdin, or by
/// assembling the requested view.
fn diagram_text(
    diagram_type: &str,
    preset: Option<&str>,
    enabled: &[String],
    disabled: &[String],
    input: Option<PathBuf>,
) -> Result<String, Box<dyn std::error::Error>> {
    match input {
        Some(path) if path.as_os_str() == "-" => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let kind: DiagramKind = diagram_type.parse()?;
            let config = build_filters(preset, enabled, disabled)?;
            Ok(assemble::assemble(kind, &config))
        }
    }
}

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use sangha::config::Config;
use sangha::tasks::spawn_lookup;
use sangha::{logging, Error, HouseholdDraft, HouseholdForm, HouseholdRecord, MemberForm, Store};

enum Command {
    Init,
    Add { draft: PathBuf },
    Show {
        address_id: String,
        json: bool,
        photos: Option<PathBuf>,
    },
    Delete { address_id: String },
}

struct Args {
    config_path: Option<PathBuf>,
    command: Command,
}

/// Household draft as written in a TOML file.
#[derive(Debug, Deserialize)]
struct DraftFile {
    household: HouseholdForm,
    #[serde(default)]
    members: Vec<MemberForm>,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut config_path = None;
    let mut json = false;
    let mut photos = None;
    let mut positional = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("sangha {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                } else {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
            }
            "--json" => json = true,
            "--photos" => {
                if i + 1 < args.len() {
                    photos = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                } else {
                    eprintln!("Error: --photos requires a directory argument");
                    std::process::exit(1);
                }
            }
            arg if arg.starts_with('-') => {
                eprintln!("Unknown argument: {}", arg);
                print_help();
                std::process::exit(1);
            }
            arg => positional.push(arg.to_string()),
        }
        i += 1;
    }

    let command = match positional.as_slice() {
        [cmd] if cmd == "init" => Command::Init,
        [cmd, draft] if cmd == "add" => Command::Add {
            draft: PathBuf::from(draft),
        },
        [cmd, id] if cmd == "show" => Command::Show {
            address_id: require_address_id(id),
            json,
            photos,
        },
        [cmd, id] if cmd == "delete" => Command::Delete {
            address_id: require_address_id(id),
        },
        _ => {
            print_help();
            std::process::exit(1);
        }
    };

    Args {
        config_path,
        command,
    }
}

fn require_address_id(raw: &str) -> String {
    let address_id = raw.trim();
    if address_id.is_empty() {
        eprintln!("Error: Please enter an Address ID!");
        std::process::exit(1);
    }
    address_id.to_string()
}

fn print_help() {
    println!(
        r#"sangha - household and family member registry

USAGE:
    sangha [OPTIONS] <COMMAND>

COMMANDS:
    init                    Create the database tables if missing
    add DRAFT.toml          Validate and save a household draft
    show ADDRESS_ID         Show a household and its family members
    delete ADDRESS_ID       Delete a household and its family members

OPTIONS:
    --config, -c PATH   Path to config file
    --json              Print `show` output as JSON
    --photos DIR        Write stored photos from `show` into DIR
    --version, -V       Show version
    --help, -h          Show this help message

ENVIRONMENT:
    SANGHA_CONFIG       Path to config file (overrides default location)
    SANGHA_LOG          Log level (trace, debug, info, warn, error)

Config file location: $XDG_CONFIG_HOME/sangha/config.toml"#
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args();

    let config = match &args.config_path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let _ = logging::init(&config.logging.dir);

    let store = Store::open(config.db_path.clone())?;
    store.ensure_schema()?;

    match args.command {
        Command::Init => {
            let count = store.count_households()?;
            println!(
                "Database ready at {} ({} households)",
                store.path().display(),
                count
            );
        }
        Command::Add { draft } => {
            let draft = load_draft(&draft)?;
            store.submit_draft(&draft)?;
            println!("Data saved successfully!");
        }
        Command::Show {
            address_id,
            json,
            photos,
        } => {
            let record = spawn_lookup(store, address_id.clone())
                .wait()
                .await?
                .ok_or(Error::NotFound(address_id))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                print_record(&record);
            }
            if let Some(dir) = photos {
                write_photos(&record, &dir)?;
            }
        }
        Command::Delete { address_id } => {
            if store.delete_household(&address_id)? {
                println!("Household deleted successfully!");
            } else {
                return Err(Error::NotFound(address_id).into());
            }
        }
    }

    Ok(())
}

/// Load a draft file. Relative photo paths are resolved against the
/// directory containing the draft.
fn load_draft(path: &Path) -> Result<HouseholdDraft> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read draft {}", path.display()))?;
    let mut file: DraftFile =
        toml::from_str(&content).with_context(|| format!("Invalid draft {}", path.display()))?;

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let resolve = |photo: &mut Option<PathBuf>| {
        if let Some(p) = photo.as_mut() {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        }
    };
    resolve(&mut file.household.photo);
    for member in &mut file.members {
        resolve(&mut member.photo);
    }

    Ok(HouseholdDraft::from_parts(file.household, file.members))
}

fn print_record(record: &HouseholdRecord) {
    let hh = &record.household;
    println!("Address ID:   {}", hh.address_id);
    println!("Owner Name:   {}", hh.owner_name);
    println!("Owner Age:    {}", hh.owner_age);
    println!("Occupation:   {}", hh.owner_occupation);
    println!("Designation:  {}", hh.owner_designation);
    println!("Mobile:       {}", hh.mobile);
    println!("Address:      {}", hh.address);
    println!("Photo:        {}", photo_summary(hh.owner_photo.as_deref()));

    if record.members.is_empty() {
        println!("\nNo family members recorded.");
        return;
    }

    println!(
        "\n{:<20} {:>4}  {:<12} {:<15} {:<15} {:<12} {}",
        "Name", "Age", "Relation", "Occupation", "Designation", "Mobile", "Photo"
    );
    for m in &record.members {
        println!(
            "{:<20} {:>4}  {:<12} {:<15} {:<15} {:<12} {}",
            m.name,
            m.age,
            m.relation,
            m.occupation,
            m.designation,
            m.mobile,
            photo_summary(m.photo.as_deref())
        );
    }
}

fn photo_summary(photo: Option<&[u8]>) -> String {
    match photo {
        Some(bytes) => format!("{} bytes", bytes.len()),
        None => "-".to_string(),
    }
}

fn write_photos(record: &HouseholdRecord, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    let key = file_safe(&record.household.address_id);

    if let Some(bytes) = &record.household.owner_photo {
        let path = dir.join(format!("{}-owner.img", key));
        std::fs::write(&path, bytes)?;
        println!("Wrote {}", path.display());
    }
    for m in &record.members {
        if let Some(bytes) = &m.photo {
            let path = dir.join(format!("{}-member-{}.img", key, m.id));
            std::fs::write(&path, bytes)?;
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}

fn file_safe(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

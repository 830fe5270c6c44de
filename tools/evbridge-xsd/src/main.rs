// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use evbridge::dynamic::TypeKind;
use evbridge::{BridgeConfig, DecodeMode, DecodedPayload, SchemaBridge, TypeDescriptor};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "evbridge-xsd")]
#[command(about = "Inspect XSD schema sets and decode event payloads")]
#[command(version)]
struct Cli {
    /// Bridge configuration (TOML)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a schema set and list the synthesized bindings
    Inspect {
        /// XSD documents, imported as one set
        #[arg(value_name = "XSD", required = true)]
        schemas: Vec<PathBuf>,

        /// Print member layouts
        #[arg(short, long)]
        verbose: bool,
    },

    /// Decode a JSON event envelope against a schema set
    Decode {
        /// XSD documents, imported as one set
        #[arg(value_name = "XSD")]
        schemas: Vec<PathBuf>,

        /// Envelope file (`{"eventType": ..., "eventData": ...}`)
        #[arg(short, long, value_name = "FILE")]
        event: PathBuf,

        /// Report unknown event types instead of failing
        #[arg(long)]
        lenient: bool,
    },

    /// Decode a transport payload (dictionary XML by default)
    Dictionary {
        /// Payload file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Content type the payload arrived with
        #[arg(long, default_value = "application/dictionary+xml")]
        content_type: String,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => BridgeConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => BridgeConfig::default(),
    };

    match cli.command {
        Commands::Inspect { schemas, verbose } => cmd_inspect(config, &schemas, verbose),
        Commands::Decode {
            schemas,
            event,
            lenient,
        } => cmd_decode(config, &schemas, &event, lenient),
        Commands::Dictionary {
            input,
            content_type,
        } => cmd_dictionary(config, &input, &content_type),
    }
}

fn read_schemas(paths: &[PathBuf]) -> anyhow::Result<Vec<String>> {
    paths
        .iter()
        .map(|path| {
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
        })
        .collect()
}

fn cmd_inspect(config: BridgeConfig, schemas: &[PathBuf], verbose: bool) -> anyhow::Result<()> {
    let bridge = SchemaBridge::with_config(config);
    let outcome = bridge.import_xsd(&read_schemas(schemas)?)?;

    println!(
        "[OK] {} element(s), {} type(s) bound",
        outcome.elements.len(),
        bridge.registry().len()
    );
    println!();

    for name in bridge.registry().names() {
        let Some(binding) = bridge.registry().binding(&name) else {
            continue;
        };
        println!("{}  {}", binding.signature, name);
        if verbose {
            for line in layout(&binding.handle) {
                println!("    {}", line);
            }
        }
    }

    for element in &outcome.elements {
        log::debug!("element {} -> {}", element.element, element.handle.name);
    }
    Ok(())
}

fn cmd_decode(
    mut config: BridgeConfig,
    schemas: &[PathBuf],
    event: &Path,
    lenient: bool,
) -> anyhow::Result<()> {
    if lenient {
        config.codec.mode = DecodeMode::Lenient;
    }
    let pretty = config.codec.pretty;
    let bridge = SchemaBridge::with_config(config);
    if !schemas.is_empty() {
        bridge.import_xsd(&read_schemas(schemas)?)?;
    }

    let bytes = std::fs::read(event).with_context(|| format!("reading {}", event.display()))?;
    match bridge.decode_envelope(&bytes)? {
        Some(data) => {
            eprintln!("[OK] {}", data.type_name());
            print_json(&data.to_json(), pretty)?;
        }
        None => bail!("event type is neither bound nor whitelisted"),
    }
    Ok(())
}

fn cmd_dictionary(config: BridgeConfig, input: &Path, content_type: &str) -> anyhow::Result<()> {
    let pretty = config.codec.pretty;
    let bridge = SchemaBridge::with_config(config);
    let payload =
        std::fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;

    match bridge.decode_message(content_type, &payload)? {
        DecodedPayload::Dictionary(value) => {
            let data = evbridge::DynamicData::from_value(&map_descriptor(), value)?;
            print_json(&data.to_json(), pretty)?;
        }
        DecodedPayload::Xml(text) => println!("{}", text),
    }
    Ok(())
}

fn map_descriptor() -> std::sync::Arc<TypeDescriptor> {
    std::sync::Arc::new(TypeDescriptor::new("dictionary", TypeKind::Map))
}

fn print_json(value: &serde_json::Value, pretty: bool) -> anyhow::Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", text);
    Ok(())
}

/// One line per member, nested types indented.
fn layout(desc: &TypeDescriptor) -> Vec<String> {
    let mut lines = Vec::new();
    push_layout(desc, 0, &mut lines);
    lines
}

fn push_layout(desc: &TypeDescriptor, depth: usize, lines: &mut Vec<String>) {
    const MAX_DEPTH: usize = 8;
    let indent = "  ".repeat(depth);
    match &desc.kind {
        TypeKind::Struct(members) => {
            for member in members {
                let marker = if member.optional { "?" } else { "" };
                lines.push(format!(
                    "{}{}{}: {}",
                    indent,
                    member.name,
                    marker,
                    type_label(&member.type_desc)
                ));
                if depth < MAX_DEPTH && member.type_desc.is_struct() {
                    push_layout(&member.type_desc, depth + 1, lines);
                }
            }
        }
        TypeKind::Sequence(seq) => {
            lines.push(format!("{}[{}]", indent, type_label(&seq.element_type)));
            if depth < MAX_DEPTH && seq.element_type.is_struct() {
                push_layout(&seq.element_type, depth + 1, lines);
            }
        }
        _ => lines.push(format!("{}{}", indent, type_label(desc))),
    }
}

fn type_label(desc: &TypeDescriptor) -> String {
    match &desc.kind {
        TypeKind::Primitive(kind) => kind.xsd_name().to_string(),
        TypeKind::Struct(_) => desc.name.clone(),
        TypeKind::Sequence(seq) => format!("[{}]", type_label(&seq.element_type)),
        TypeKind::Map => "map".to_string(),
        TypeKind::Reference(name) => format!("&{}", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use evbridge::dynamic::{PrimitiveKind, TypeDescriptorBuilder};
    use std::sync::Arc;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_layout_lines() {
        let leg = Arc::new(
            TypeDescriptorBuilder::new("Leg")
                .field("qty", PrimitiveKind::I32)
                .build(),
        );
        let order = TypeDescriptorBuilder::new("Order")
            .field("id", PrimitiveKind::Guid)
            .optional_field("note", PrimitiveKind::String)
            .sequence_field("legs", leg)
            .build();

        assert_eq!(
            layout(&order),
            vec!["id: guid", "note?: string", "legs: [Leg]"]
        );
    }
}

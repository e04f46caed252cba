// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::io::Read;
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use condense::resolvers::StaticStacks;
use condense::rules::{FileComponents, OsFiles};
use condense::{Engine, Value};

fn read_template(file: &str) -> Result<Value> {
    if file == "-" {
        let mut contents = String::new();
        std::io::stdin()
            .read_to_string(&mut contents)
            .context("Failed to read template from stdin")?;
        return Value::from_json_str(&contents);
    }
    Value::from_file(file).with_context(|| format!("Failed to read {file}"))
}

/// An argument holding a json object or array is inline parameters; anything
/// else names a file.
fn inline_parameters(arg: &str) -> Option<Value> {
    match Value::from_json_str(arg) {
        Ok(document @ (Value::Object(_) | Value::Array(_))) => Some(document),
        _ => None,
    }
}

fn add_parameters(engine: &mut Engine, parameters: &[String]) -> Result<()> {
    for p in parameters {
        match inline_parameters(p) {
            Some(document) => engine.add_parameters("[inline]", document)?,
            None => engine
                .add_parameters_from_file(p)
                .with_context(|| format!("Failed to load parameters {p}"))?,
        }
    }
    Ok(())
}

fn print_value(value: &Value) -> Result<()> {
    println!("{}", value.to_json_str()?);
    Ok(())
}

fn condense(cli: Cli) -> Result<()> {
    let mut engine = Engine::new();
    add_parameters(&mut engine, &cli.parameters)?;

    if let Some(stacks) = &cli.stacks {
        let stacks =
            StaticStacks::from_file(stacks).with_context(|| format!("Failed to read {stacks}"))?;
        engine.add_stack_client(Rc::new(stacks));
    }

    if !cli.components.is_empty() {
        let files = Rc::new(OsFiles::new());
        engine.set_component_source(Rc::new(FileComponents::new(files, cli.components.clone())));
    }

    engine.set_reduce_conditions(!cli.keep_conditions);

    let template = read_template(&cli.template)?;
    let expansion = engine.expand(&template)?;

    match cli.output.split_once(':') {
        None if cli.output == "template" => print_value(&expansion.template),
        None if cli.output == "parameters" => {
            println!("{}", serde_json::to_string_pretty(&expansion.parameters)?);
            Ok(())
        }
        None if cli.output == "credentials" => match expansion.credentials.as_slice() {
            [single] => print_value(&single.document),
            all => {
                let documents: Vec<Value> = all.iter().map(|c| c.document.clone()).collect();
                print_value(&Value::from(documents))
            }
        },
        Some(("credentials", name)) => match expansion.credentials_for(name) {
            Some(credentials) => print_value(&credentials.document),
            None => bail!("No parameters file '{name}' was input"),
        },
        _ => bail!(
            "Unknown output `{}`. Must be template, parameters or credentials[:name].",
            cli.output
        ),
    }
}

/// Expand the macros of an infrastructure template.
#[derive(clap::Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Template file. json, or `-` for stdin.
    #[arg(long, short, default_value = "-", value_name = "template.json")]
    template: String,

    /// Parameters. Inline json, or a json/yaml file. Later ones take priority.
    #[arg(long, short, value_name = "params.json")]
    parameters: Vec<String>,

    /// Stack outputs and resources, as `{stack: {"Outputs": {..}, "Resources": {..}}}`.
    #[arg(long, short, value_name = "stacks.json")]
    stacks: Option<String>,

    /// Directories searched for `Fn::Component` fragments.
    #[arg(long, short, value_name = "dir")]
    components: Vec<String>,

    /// Leave booleans under `Conditions` alone.
    #[arg(long)]
    keep_conditions: bool,

    /// What to print.
    #[arg(
        long,
        short,
        default_value = "template",
        value_name = "template|parameters|credentials[:name]"
    )]
    output: String,
}

fn main() -> Result<()> {
    env_logger::init();
    condense(Cli::parse())
}

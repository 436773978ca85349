//! `rrdgraph` command-line interface

use crate::access::{FileScope, ReadableAccess};
use crate::evaluator::TemplateEvaluator;
use crate::matcher::FsPathMatcher;
use crate::profile::{GraphProfile, ProfileError};
use crate::renderer::RrdtoolRenderer;
use clap::{Parser, Subcommand};
use rrdgraph_compiler::host::{Collaborators, Environment, RequestContext};
use rrdgraph_compiler::pipeline::{self, ErrorClass, PipelineError};
use rrdgraph_compiler::{CompiledGraph, Configuration, RenderGate};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "rrdgraph")]
#[command(author, version, about = "Compile graph descriptions into rrdtool graph arguments", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile one graph request
    Compile {
        /// Requested image path; its directory is the base for source patterns
        #[arg(long, value_name = "FILE")]
        target: PathBuf,

        /// Graph profile (TOML) with configured format, options and elements
        #[arg(long, value_name = "TOML")]
        profile: Option<PathBuf>,

        /// Request query string, e.g. 'DEF:x=*.rrd:load:AVERAGE&LINE1:x'
        #[arg(long, default_value = "")]
        query: String,

        /// Seed environment variable (can be specified multiple times)
        #[arg(long = "env", value_name = "KEY=VALUE")]
        env: Vec<String>,

        /// Only match files under this directory
        #[arg(long, value_name = "DIR")]
        root: Option<PathBuf>,

        /// Render the graph and write it to this file
        #[arg(long, value_name = "OUT")]
        render: Option<PathBuf>,

        /// Print the compiled graph as JSON
        #[arg(long)]
        json: bool,

        /// rrdtool executable
        #[arg(long, default_value = "rrdtool")]
        rrdtool: PathBuf,

        /// Renderer timeout in seconds
        #[arg(long, default_value = "30")]
        timeout: u64,
    },

    /// Show compiler capabilities
    Info,
}

/// CLI failures; pipeline errors keep their class for the exit status
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error("Invalid --env value '{0}', expected KEY=VALUE")]
    InvalidEnv(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// 1 for client errors, 2 for server errors
    pub fn exit_code(&self) -> i32 {
        let class = match self {
            Self::Pipeline(e) => e.class(),
            Self::Profile(ProfileError::Configuration(e)) => e.class(),
            Self::InvalidEnv(_) => ErrorClass::Client,
            _ => ErrorClass::Server,
        };
        match class {
            ErrorClass::Client => 1,
            ErrorClass::Server => 2,
        }
    }
}

pub fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Compile {
            target,
            profile,
            query,
            env,
            root,
            render,
            json,
            rrdtool,
            timeout,
        } => {
            let configuration = match &profile {
                Some(path) => GraphProfile::load(path)?.to_configuration()?,
                None => Configuration::new(),
            };

            let access = match &root {
                Some(root) => ReadableAccess::within(root)?,
                None => ReadableAccess::new(),
            };
            let matcher = FsPathMatcher::new();
            let evaluator = TemplateEvaluator::new();
            let collaborators = Collaborators::new(&matcher, &access, &evaluator);

            let request = RequestContext::new(target.clone(), FileScope::for_target(&target))
                .with_environment(parse_env(&env)?);

            let compiled = pipeline::compile(&configuration, &query, &request, &collaborators)?;
            print_compiled(&compiled, json)?;

            if let Some(out) = render {
                let gate = RenderGate::new(
                    RrdtoolRenderer::new()
                        .with_program(rrdtool)
                        .with_timeout(Duration::from_secs(timeout)),
                );
                let rendered = pipeline::render_graph(&gate, &compiled)?;
                fs::write(&out, &rendered.bytes)?;
                eprintln!(
                    "[OK] {} bytes of {} written to {}",
                    rendered.bytes.len(),
                    rendered.content_type,
                    out.display()
                );
            }

            Ok(())
        }
        Commands::Info => {
            println!("{}", pipeline::get_pipeline_info().report());
            Ok(())
        }
    }
}

fn print_compiled(compiled: &CompiledGraph, json: bool) -> Result<(), CliError> {
    if json {
        println!("{}", serde_json::to_string_pretty(compiled)?);
    } else {
        for argument in &compiled.arguments {
            println!("{}", argument);
        }
    }
    Ok(())
}

fn parse_env(pairs: &[String]) -> Result<Environment, CliError> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .filter(|(key, _)| !key.is_empty())
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .ok_or_else(|| CliError::InvalidEnv(pair.clone()))
        })
        .collect()
}

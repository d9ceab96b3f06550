// Mon Oct 19 2026 - Alex

use super::args::{Args, Command, DumpArgs, ProfilesArgs, QueryArgs};
use crate::abi::AbiProfile;
use crate::config::Config;
use crate::error::LayoutError;
use crate::output::{JsonExporter, ReportFormatter};
use crate::query::{LayoutReport, LayoutSession};
use crate::resolver::SourceUnit;
use crate::utils::{pluralize, LoggingUtils};
use anyhow::{anyhow, bail, Context};
use colored::Colorize;
use std::fs;
use std::path::Path;

pub struct CommandHandler {
    quiet: bool,
    json_output: bool,
    use_color: bool,
}

impl CommandHandler {
    pub fn new() -> Self {
        Self { quiet: false, json_output: false, use_color: true }
    }

    pub fn execute(mut self, args: Args) -> anyhow::Result<()> {
        self.quiet = args.quiet;
        self.json_output = args.json_output;
        self.use_color = !args.no_color;
        if args.no_color {
            colored::control::set_override(false);
        }

        self.setup_logging(&args);
        let config = self.load_config(&args)?;

        match &args.command {
            Command::Query(query) => self.handle_query(query, &config),
            Command::Dump(dump) => self.handle_dump(dump, &config),
            Command::Profiles(profiles) => self.handle_profiles(profiles, &config, args.profile.is_some() || args.config.is_some()),
        }
    }

    fn setup_logging(&self, args: &Args) {
        let level = if args.verbose > 0 {
            LoggingUtils::level_from_verbosity(args.verbose)
        } else {
            LoggingUtils::level_from_str(&args.log_level)
        };
        LoggingUtils::init_logger(level, self.use_color);
    }

    fn load_config(&self, args: &Args) -> anyhow::Result<Config> {
        let mut config = match &args.config {
            Some(path) => {
                let text = fs::read_to_string(path).with_context(|| format!("reading config {:?}", path))?;
                Config::from_json(&text).with_context(|| format!("parsing config {:?}", path))?
            }
            None => Config::default(),
        };
        if let Some(profile) = &args.profile {
            config = config.with_profile(profile);
        }
        config.validate().map_err(|e| anyhow!(e)).context("invalid configuration")?;
        Ok(config)
    }

    fn load_session(&self, path: &Path, config: &Config) -> anyhow::Result<LayoutSession> {
        let text = fs::read_to_string(path).with_context(|| format!("reading unit {:?}", path))?;
        let unit = SourceUnit::from_json(&text).with_context(|| format!("parsing unit {:?}", path))?;
        let (session, outcome) = LayoutSession::from_unit(&unit);
        if !outcome.is_clean() && !self.quiet {
            eprintln!(
                "{}",
                format!("{} did not resolve", pluralize(outcome.errors.len(), "declaration", "declarations")).yellow()
            );
        }
        Ok(session.with_policy(config.base_policy).with_cache(config.cache_layouts))
    }

    fn formatter(&self, config: &Config, hide_padding: bool) -> ReportFormatter {
        ReportFormatter::new()
            .with_color(self.use_color)
            .with_offset_format(config.offset_format)
            .with_padding(!hide_padding)
    }

    fn emit(&self, results: &[(String, Result<LayoutReport, LayoutError>)], config: &Config, hide_padding: bool) -> anyhow::Result<String> {
        if self.json_output {
            let text = JsonExporter::new().with_padding(!hide_padding).serialize_results(results)?;
            return Ok(text);
        }
        let formatter = self.formatter(config, hide_padding);
        let blocks: Vec<String> = results
            .iter()
            .map(|(query, result)| match result {
                Ok(report) => formatter.format_report(report),
                Err(e) => formatter.format_error(query, e),
            })
            .collect();
        Ok(blocks.join("\n\n"))
    }

    fn finish(&self, results: &[(String, Result<LayoutReport, LayoutError>)]) -> anyhow::Result<()> {
        let failures = results.iter().filter(|(_, r)| r.is_err()).count();
        if failures > 0 {
            bail!("{} could not be laid out", pluralize(failures, "type", "types"));
        }
        Ok(())
    }

    fn handle_query(&self, args: &QueryArgs, config: &Config) -> anyhow::Result<()> {
        args.validate().map_err(|e| anyhow!(e))?;
        let profile = config.abi_profile()?;
        let session = self.load_session(&args.unit, config)?;

        let results: Vec<(String, Result<LayoutReport, LayoutError>)> = args
            .types
            .iter()
            .cloned()
            .zip(session.layout_many(&args.types, &profile))
            .collect();

        println!("{}", self.emit(&results, config, args.hide_padding)?);
        self.finish(&results)
    }

    fn handle_dump(&self, args: &DumpArgs, config: &Config) -> anyhow::Result<()> {
        args.validate().map_err(|e| anyhow!(e))?;
        let profile = config.abi_profile()?;
        let session = self.load_session(&args.unit, config)?;
        let results = session.dump(&profile);

        if !self.quiet && !self.json_output {
            println!(
                "{}",
                format!("{} under {}", pluralize(results.len(), "aggregate", "aggregates"), profile.name()).cyan()
            );
        }
        let text = self.emit(&results, config, args.hide_padding)?;
        match &args.output {
            Some(path) => {
                fs::write(path, &text).with_context(|| format!("writing {:?}", path))?;
                if !self.quiet {
                    println!("{}", format!("Output written to: {:?}", path).green());
                }
            }
            None => println!("{}", text),
        }
        self.finish(&results)
    }

    fn handle_profiles(&self, args: &ProfilesArgs, config: &Config, configured: bool) -> anyhow::Result<()> {
        let profiles = if !args.names.is_empty() {
            args.names.iter().map(|name| AbiProfile::preset(name)).collect::<Result<Vec<_>, _>>()?
        } else if configured {
            vec![config.abi_profile()?]
        } else {
            AbiProfile::preset_names()
                .iter()
                .map(|name| AbiProfile::preset(name))
                .collect::<Result<Vec<_>, _>>()?
        };

        if self.json_output {
            println!("{}", JsonExporter::new().serialize_profiles(&profiles)?);
        } else {
            let formatter = ReportFormatter::new().with_color(self.use_color);
            let tables: Vec<String> = profiles.iter().map(|p| formatter.format_profile(p)).collect();
            println!("{}", tables.join("\n\n"));
        }
        Ok(())
    }
}

impl Default for CommandHandler {
    fn default() -> Self {
        Self::new()
    }
}

// Sat Oct 17 2026 - Alex

use super::args::{Args, Command, GenerateArgs, KnownTypesArgs, SymbolsArgs};
use crate::config::Config;
use crate::engine::Exposure;
use crate::hierarchy::{discover, HierarchyDeclaration};
use crate::symbol::{read_exported_symbols, Demangler, ItaniumDemangler, KnownTypesPattern};
use crate::ui::progress::ProgressManager;
use crate::ui::{print_info, print_success, print_warning};
use anyhow::Context;
use colored::Colorize;
use std::time::Instant;

pub struct CommandHandler {
    progress: ProgressManager,
}

impl CommandHandler {
    pub fn new() -> Self {
        Self {
            progress: ProgressManager::new(),
        }
    }

    pub fn execute(&self, args: Args) -> anyhow::Result<()> {
        self.setup_logging(&args);

        if args.no_color {
            colored::control::set_override(false);
        }

        match args.command {
            Command::Generate(gen_args) => self.handle_generate(gen_args, args.quiet),
            Command::KnownTypes(known_args) => self.handle_known_types(known_args),
            Command::Symbols(symbol_args) => self.handle_symbols(symbol_args),
        }
    }

    fn setup_logging(&self, args: &Args) {
        env_logger::Builder::new()
            .filter_level(log_level(args))
            .format_timestamp(None)
            .init();
    }

    fn load_config(&self, args: &GenerateArgs) -> anyhow::Result<Config> {
        let mut config = match &args.config {
            Some(path) => Config::from_file(path).map_err(|e| anyhow::anyhow!(e))?,
            None => Config::default(),
        };

        if let Some(binary) = &args.binary {
            config = config.with_artifact(binary.clone());
        }
        if let Some(output) = &args.output {
            config = config.with_output_file(output.clone());
        }
        if !args.sections.is_empty() {
            config = config.with_code_sections(args.sections.clone());
        }
        if let Some(function) = &args.upcast_function {
            config = config.with_upcast_function(function);
        }
        if args.compact {
            config = config.with_pretty_print(false);
        }

        config.validate().map_err(|e| anyhow::anyhow!(e))?;
        Ok(config)
    }

    fn handle_generate(&self, args: GenerateArgs, quiet: bool) -> anyhow::Result<()> {
        args.validate().map_err(|e| anyhow::anyhow!(e))?;
        let start_time = Instant::now();
        let config = self.load_config(&args)?;

        let artifact = config
            .artifact
            .clone()
            .ok_or_else(|| anyhow::anyhow!("No binary given and no artifact in the config"))?;

        if !quiet {
            print_info(&format!("Loading hierarchy: {}", args.hierarchy.display()));
        }
        let declared = HierarchyDeclaration::from_file(&args.hierarchy)?
            .build()
            .with_context(|| format!("Invalid hierarchy in {}", args.hierarchy.display()))?;
        let seeds = declared.seeds.len();

        let locate = artifact.clone();
        let exposure = Exposure::from_declared(declared, move || Ok(locate.clone()))?.with_config(config.clone())?;

        let spinner = if args.no_progress || quiet {
            None
        } else {
            Some(self.progress.create_spinner(&format!("Scanning {}", artifact.display())))
        };

        let result = exposure.casts_table();
        if let Some(pb) = &spinner {
            pb.finish_and_clear();
        }
        let table = result?;

        let bindings: usize = table.entries().values().map(|bases| bases.len()).sum();
        if bindings == 0 && !table.is_empty() {
            print_warning("No upcast symbols matched; is the binary built with the exposed types?");
        }

        table.write_to(&config.output_file, config.pretty_print)?;

        if config.verbose && !quiet {
            for (derived, bases) in table.entries() {
                println!("  {}", derived.cyan());
                for (base, symbol) in bases {
                    println!("    {} {}", base.green(), symbol.dimmed());
                }
            }
        }

        if !quiet {
            print_success(&format!(
                "{} exposed types, {} upcasts from {} seeds",
                table.len(),
                bindings,
                seeds
            ));
            print_success(&format!("Casts table written to: {}", config.output_file.display()));
            print_success(&format!("Done in {:.2}s", start_time.elapsed().as_secs_f64()));
        }
        Ok(())
    }

    fn handle_known_types(&self, args: KnownTypesArgs) -> anyhow::Result<()> {
        let declared = HierarchyDeclaration::from_file(&args.hierarchy)?.build()?;
        let (_, catalog) = discover(&declared.registry, &declared.seeds)?;

        if args.list {
            for name in catalog.names() {
                println!("{}", name);
            }
        } else {
            println!("{}", KnownTypesPattern::from_catalog(&catalog)?);
        }
        Ok(())
    }

    fn handle_symbols(&self, args: SymbolsArgs) -> anyhow::Result<()> {
        let sections = if args.sections.is_empty() {
            Config::default().code_sections
        } else {
            args.sections
        };
        let symbols = read_exported_symbols(&args.binary, &sections)?;

        match &symbols.section {
            Some(section) => print_info(&format!("{} symbols in {}", symbols.len(), section.cyan())),
            None => print_warning(&format!("None of the sections {:?} found", sections)),
        }

        let demangler = ItaniumDemangler;
        for name in &symbols.names {
            let shown = if args.demangle {
                demangler.demangle(name)
            } else {
                name.clone()
            };
            if args.filter.as_deref().map_or(true, |needle| shown.contains(needle)) {
                println!("{}", shown);
            }
        }
        Ok(())
    }
}

impl Default for CommandHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// `-q` caps logging at warnings, `-v` raises it to debug, otherwise `--log-level`.
fn log_level(args: &Args) -> log::LevelFilter {
    if args.quiet {
        return log::LevelFilter::Warn;
    }
    if args.verbose {
        return log::LevelFilter::Debug;
    }
    match args.log_level.to_lowercase().as_str() {
        "trace" => log::LevelFilter::Trace,
        "debug" => log::LevelFilter::Debug,
        "info" => log::LevelFilter::Info,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        "off" => log::LevelFilter::Off,
        _ => log::LevelFilter::Info,
    }
}

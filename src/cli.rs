#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    Generate(GenerateOptions),
    ListTemplates,
    InitConfig,
    Help,
    Version,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    pub topic: String,
    pub count: Option<usize>,
    pub seed: Option<u64>,
    /// 1-based position of the title to copy.
    pub copy: Option<usize>,
    pub json: bool,
    pub no_delay: bool,
}

pub const USAGE: &str = "\
Usage: titlegen [OPTIONS] <TOPIC>...

Options:
  --count <N>        number of titles to generate (default 5)
  --seed <N>         seed the shuffle for reproducible output
  --copy <N>         copy title N (1-based) to the clipboard (on X11 this needs a
                     clipboard manager to outlive the process)
  --json             print the session as JSON
  --no-delay         skip the simulated generation delay
  --list-templates   print the built-in templates and exit
  --init-config      write the current settings to the settings file and exit
  -h, --help         print this help
  -V, --version      print the version";

/// Parses the full argv (program name first).
pub fn parse_cli_action(args: &[String]) -> Result<CliAction, String> {
    let mut options = GenerateOptions::default();
    let mut words: Vec<&str> = Vec::new();
    let mut rest = args.iter().skip(1);

    while let Some(arg) = rest.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if arg.starts_with("--") => (flag, Some(value.to_string())),
            _ => (arg.as_str(), None),
        };

        match flag {
            "-h" | "--help" => return Ok(CliAction::Help),
            "-V" | "--version" => return Ok(CliAction::Version),
            "--list-templates" => return Ok(CliAction::ListTemplates),
            "--init-config" => return Ok(CliAction::InitConfig),
            "--json" => options.json = true,
            "--no-delay" => options.no_delay = true,
            "--count" => {
                let value = flag_value(flag, inline, &mut rest)?;
                options.count = Some(parse_number(flag, &value)?);
            }
            "--seed" => {
                let value = flag_value(flag, inline, &mut rest)?;
                options.seed = Some(parse_number(flag, &value)?);
            }
            "--copy" => {
                let value = flag_value(flag, inline, &mut rest)?;
                let position: usize = parse_number(flag, &value)?;
                if position == 0 {
                    return Err("--copy positions start at 1".to_string());
                }
                options.copy = Some(position);
            }
            "--" => {
                words.extend(rest.by_ref().map(String::as_str));
            }
            other if other.starts_with("--") => {
                return Err(format!("Unknown option: {other}"));
            }
            _ => words.push(arg),
        }
    }

    options.topic = words.join(" ");
    Ok(CliAction::Generate(options))
}

fn flag_value<'a>(
    flag: &str,
    inline: Option<String>,
    rest: &mut impl Iterator<Item = &'a String>,
) -> Result<String, String> {
    match inline {
        Some(value) => Ok(value),
        None => rest
            .next()
            .cloned()
            .ok_or_else(|| format!("{flag} needs a value")),
    }
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: &str) -> Result<T, String> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| format!("{flag} expects a non-negative integer, got '{value}'"))
}

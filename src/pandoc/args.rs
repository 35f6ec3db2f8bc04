//! Translation of a final configuration into converter arguments.

use super::options::is_command_line_option;
use crate::assemble::FinalConfig;
use crate::config::{Mapping, is_truthy};
use crate::error::StyleResult;
use crate::keys::{
    CFG_TEMP_FILE, COMMAND_LINE, COMPLEX_METADATA_FILE, CUR_METADATA_FILE, EXPANDABLE_VARIABLES,
    FILTER, LUA_FILTER, METADATA, PANDOC_STYLES_MD, TEMPLATE_VARIABLES, VERBATIM_VARIABLES,
};
use crate::paths::{AssetResolver, path_to_forward_slashes, scalar_to_string};
use crate::yaml::{self, make_list};
use serde_json::Value;

/// Run-level inputs to argument building that are not part of the configuration.
#[derive(Debug, Clone, Copy)]
pub struct ArgContext<'a> {
    pub assets: &'a AssetResolver,
    /// Input format, passed as `--read`.
    pub from_format: Option<&'a str>,
    /// Separate metadata file given on the command line.
    pub metadata_file: Option<&'a str>,
}

/// How a key of a legacy group is spelled on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prefix {
    /// `--key` / `--key=value`
    Long,
    /// `-M key` / `-M key=value`
    Metadata,
    /// `-V key` / `-V key=value`
    Variable,
}

impl Prefix {
    fn push(self, args: &mut Vec<String>, key: &str, value: Option<&str>) {
        let assignment = match value {
            Some(value) => format!("{key}={value}"),
            None => key.to_string(),
        };
        match self {
            Prefix::Long => args.push(format!("--{assignment}")),
            Prefix::Metadata => args.extend(["-M".to_string(), assignment]),
            Prefix::Variable => args.extend(["-V".to_string(), assignment]),
        }
    }
}

const LEGACY_GROUPS: [(&str, Prefix); 3] = [
    (COMMAND_LINE, Prefix::Long),
    (METADATA, Prefix::Metadata),
    (TEMPLATE_VARIABLES, Prefix::Variable),
];

/// Push `key` once per item of `value`.
///
/// Falsy items are skipped, `true` becomes a bare flag, anything else a
/// path-expanded value.
fn push_items(args: &mut Vec<String>, prefix: Prefix, key: &str, value: &Value, assets: &AssetResolver) {
    for item in make_list(Some(value)) {
        if !is_truthy(&item) {
            continue;
        }
        if item == Value::Bool(true) {
            prefix.push(args, key, None);
        } else {
            let expanded = assets.expand_value(&item, key);
            prefix.push(args, key, Some(expanded.as_str()));
        }
    }
}

fn take_mapping(cfg: &mut FinalConfig, key: &str) -> Mapping {
    match cfg.remove(key) {
        Some(Value::Object(map)) => map,
        _ => Mapping::new(),
    }
}

/// Build the converter argument list for `cfg`.
///
/// Consumed keys are removed from `cfg`; what remains is written as a
/// metadata block and passed after the input files. The full configuration
/// is also written to the temp dir and announced to filters via
/// `-M pandoc_styles_=<file>`.
pub fn build_args(cfg: &mut FinalConfig, ctx: &ArgContext<'_>) -> StyleResult<Vec<String>> {
    let temp_dir = cfg.temp_dir().to_path_buf();
    let mut args = vec![
        "-t".to_string(),
        cfg.to_fmt().to_string(),
        "-o".to_string(),
        cfg.output_file().to_string(),
    ];

    if let Some(from) = ctx.from_format {
        args.extend(["--read".to_string(), from.to_string()]);
    }

    let cfg_file = temp_dir.join(CFG_TEMP_FILE);
    yaml::dump_to(cfg.as_mapping(), &cfg_file)?;
    args.extend([
        "-M".to_string(),
        format!("{}={}", PANDOC_STYLES_MD, path_to_forward_slashes(&cfg_file)),
    ]);

    let options: Vec<String> = cfg
        .as_mapping()
        .keys()
        .filter(|k| is_command_line_option(k))
        .cloned()
        .collect();
    for key in &options {
        let Some(value) = cfg.get(key) else {
            continue;
        };
        if key == FILTER {
            for item in make_list(Some(value)) {
                if !is_truthy(&item) {
                    continue;
                }
                let item = scalar_to_string(&item);
                let flag = if item.ends_with(".lua") { LUA_FILTER } else { FILTER };
                let expanded = ctx.assets.expand(&item, flag);
                Prefix::Long.push(&mut args, flag, Some(expanded.as_str()));
            }
        } else {
            push_items(&mut args, Prefix::Long, key, value, ctx.assets);
        }
    }

    for (key, value) in take_mapping(cfg, VERBATIM_VARIABLES) {
        Prefix::Variable.push(&mut args, &key, Some(scalar_to_string(&value).as_str()));
    }

    // Document values win over expandable defaults.
    for (key, value) in take_mapping(cfg, EXPANDABLE_VARIABLES) {
        if cfg.get(&key).is_some_and(is_truthy) {
            continue;
        }
        let expanded = ctx.assets.expand_value(&value, &key);
        Prefix::Variable.push(&mut args, &key, Some(expanded.as_str()));
    }
    // Options are removed only after the expandable defaults have seen them.
    for key in &options {
        cfg.remove(key);
    }

    let mut complex = Mapping::new();
    for (group, prefix) in LEGACY_GROUPS {
        for (key, value) in take_mapping(cfg, group) {
            if make_list(Some(&value)).iter().any(Value::is_object) {
                complex.insert(key, value);
            } else {
                push_items(&mut args, prefix, &key, &value, ctx.assets);
            }
        }
    }
    if !complex.is_empty() {
        let path = temp_dir.join(COMPLEX_METADATA_FILE);
        yaml::dump_metadata_block(&complex, &path)?;
        args.push(path_to_forward_slashes(&path));
    }

    args.extend(cfg.current_files());
    if let Some(metadata_file) = ctx.metadata_file {
        args.push(metadata_file.to_string());
    }

    let meta = temp_dir.join(CUR_METADATA_FILE);
    yaml::dump_metadata_block(cfg.as_mapping(), &meta)?;
    args.push(path_to_forward_slashes(&meta));
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::PackLocator;
    use serde_json::json;
    use tempfile::TempDir;

    struct Fixture {
        temp: TempDir,
        assets: AssetResolver,
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let config_dir = temp.path().join("config");
        let locator = PackLocator::new(temp.path(), config_dir.join("styles"));
        let assets = AssetResolver::new(locator, config_dir);
        Fixture { temp, assets }
    }

    fn cfg(fx: &Fixture, extra: Value) -> FinalConfig {
        let temp_dir = path_to_forward_slashes(fx.temp.path());
        let mut base = json!({
            "current-files": ["a.md", "b.md"],
            "output_file": "out.html",
            "fmt": "html",
            "to_fmt": "html",
            "temp-dir": temp_dir,
            "verbatim-variables": {},
        });
        for (k, v) in extra.as_object().unwrap() {
            base[k] = v.clone();
        }
        FinalConfig::new(serde_json::from_value(base).unwrap())
    }

    fn ctx(fx: &Fixture) -> ArgContext<'_> {
        ArgContext {
            assets: &fx.assets,
            from_format: None,
            metadata_file: None,
        }
    }

    fn has_pair(args: &[String], flag: &str, value: &str) -> bool {
        args.windows(2).any(|w| w[0] == flag && w[1] == value)
    }

    #[test]
    fn test_head_and_tail_of_arguments() {
        let fx = fixture();
        let mut config = cfg(&fx, json!({}));
        let context = ArgContext {
            from_format: Some("markdown"),
            metadata_file: Some("meta.yaml"),
            ..ctx(&fx)
        };
        let args = build_args(&mut config, &context).unwrap();

        assert_eq!(&args[..4], &["-t", "html", "-o", "out.html"]);
        assert!(has_pair(&args, "--read", "markdown"));
        let cfg_file = path_to_forward_slashes(&fx.temp.path().join("cfg.yaml"));
        assert!(has_pair(&args, "-M", &format!("pandoc_styles_={cfg_file}")));

        let n = args.len();
        assert_eq!(&args[n - 4..n - 1], &["a.md", "b.md", "meta.yaml"]);
        assert!(args[n - 1].ends_with("cur_metadata.yaml"));
        assert!(fx.temp.path().join("cfg.yaml").is_file());
    }

    #[test]
    fn test_allow_listed_options() {
        let fx = fixture();
        let mut config = cfg(
            &fx,
            json!({
                "toc": true,
                "number-sections": false,
                "css": ["a.css", "b.css"],
                "toc-depth": 2,
                "title": "kept",
            }),
        );
        let args = build_args(&mut config, &ctx(&fx)).unwrap();

        assert!(args.contains(&"--toc".to_string()));
        assert!(!args.iter().any(|a| a.starts_with("--number-sections")));
        assert!(args.contains(&"--css=a.css".to_string()));
        assert!(args.contains(&"--css=b.css".to_string()));
        assert!(args.contains(&"--toc-depth=2".to_string()));
        assert!(!config.contains_key("toc"));
        assert!(!config.contains_key("css"));
        assert!(config.contains_key("title"));
    }

    #[test]
    fn test_lua_filters_are_split_out() {
        let fx = fixture();
        let mut config = cfg(&fx, json!({"filter": ["quote.py", "poem.lua"]}));
        let args = build_args(&mut config, &ctx(&fx)).unwrap();
        assert!(args.contains(&"--filter=quote.py".to_string()));
        assert!(args.contains(&"--lua-filter=poem.lua".to_string()));
    }

    #[test]
    fn test_variables() {
        let fx = fixture();
        let mut config = cfg(
            &fx,
            json!({
                "verbatim-variables": {"output_file": "out.html"},
                "expandable-variables": {"logo": "logo.png", "lang": "en"},
                "lang": "de",
            }),
        );
        let args = build_args(&mut config, &ctx(&fx)).unwrap();
        assert!(has_pair(&args, "-V", "output_file=out.html"));
        assert!(has_pair(&args, "-V", "logo=logo.png"));
        assert!(!has_pair(&args, "-V", "lang=en"));
        assert!(!config.contains_key("verbatim-variables"));
        assert!(!config.contains_key("expandable-variables"));
    }

    #[test]
    fn test_option_value_shadows_expandable_default() {
        let fx = fixture();
        let mut config = cfg(
            &fx,
            json!({
                "css": "doc.css",
                "expandable-variables": {"css": "default.css", "logo": "logo.png"},
            }),
        );
        let args = build_args(&mut config, &ctx(&fx)).unwrap();
        assert!(args.contains(&"--css=doc.css".to_string()));
        assert!(!has_pair(&args, "-V", "css=default.css"));
        assert!(has_pair(&args, "-V", "logo=logo.png"));
        assert!(!config.contains_key("css"));
    }

    #[test]
    fn test_legacy_groups() {
        let fx = fixture();
        let mut config = cfg(
            &fx,
            json!({
                "command-line": {"standalone": true, "columns": 80},
                "metadata": {"lang": "en", "authors": [{"name": "A"}]},
                "template-variables": {"fontsize": "12pt", "draft": false},
            }),
        );
        let args = build_args(&mut config, &ctx(&fx)).unwrap();

        assert!(args.contains(&"--standalone".to_string()));
        assert!(args.contains(&"--columns=80".to_string()));
        assert!(has_pair(&args, "-M", "lang=en"));
        assert!(has_pair(&args, "-V", "fontsize=12pt"));
        assert!(!args.iter().any(|a| a.contains("draft")));

        let complex = fx.temp.path().join("cmplx_metadata.yaml");
        assert!(args.contains(&path_to_forward_slashes(&complex)));
        let text = std::fs::read_to_string(complex).unwrap();
        assert!(text.starts_with("---\n"));
        assert!(text.contains("authors"));
        assert!(!config.contains_key("metadata"));
    }

    #[test]
    fn test_remaining_config_is_dumped() {
        let fx = fixture();
        let mut config = cfg(&fx, json!({"title": "Book", "toc": true}));
        build_args(&mut config, &ctx(&fx)).unwrap();
        let text = std::fs::read_to_string(fx.temp.path().join("cur_metadata.yaml")).unwrap();
        assert!(text.contains("title: Book"));
        assert!(!text.contains("toc:"));
    }
}

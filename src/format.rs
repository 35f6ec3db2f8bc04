//! Supported converter output formats.

use crate::error::{StyleError, StyleResult};
use std::fmt;

/// LaTeX engines that make the converter produce PDF through LaTeX.
pub const LATEX_ENGINES: &[&str] = &["pdflatex", "xelatex", "lualatex", "tectonic", "latexmk"];

/// Output format requested for a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Html,
    Html4,
    Html5,
    Pdf,
    Latex,
    Beamer,
    Context,
    Docx,
    Odt,
    Epub,
    Epub2,
    Epub3,
    Markdown,
    Gfm,
    CommonMark,
    Plain,
    Rst,
    Rtf,
    Pptx,
    RevealJs,
    Slidy,
    AsciiDoc,
    Org,
    MediaWiki,
    DocBook,
    Man,
    Ms,
    Jats,
    Json,
    Texinfo,
    Typst,
}

impl OutputFormat {
    /// Parse a format name as given on the command line or in metadata.
    pub fn parse(name: &str) -> StyleResult<Self> {
        let format = match name.to_lowercase().as_str() {
            "html" => OutputFormat::Html,
            "html4" => OutputFormat::Html4,
            "html5" => OutputFormat::Html5,
            "pdf" => OutputFormat::Pdf,
            "latex" => OutputFormat::Latex,
            "beamer" => OutputFormat::Beamer,
            "context" => OutputFormat::Context,
            "docx" => OutputFormat::Docx,
            "odt" => OutputFormat::Odt,
            "epub" => OutputFormat::Epub,
            "epub2" => OutputFormat::Epub2,
            "epub3" => OutputFormat::Epub3,
            "markdown" => OutputFormat::Markdown,
            "gfm" => OutputFormat::Gfm,
            "commonmark" => OutputFormat::CommonMark,
            "plain" => OutputFormat::Plain,
            "rst" => OutputFormat::Rst,
            "rtf" => OutputFormat::Rtf,
            "pptx" => OutputFormat::Pptx,
            "revealjs" => OutputFormat::RevealJs,
            "slidy" => OutputFormat::Slidy,
            "asciidoc" => OutputFormat::AsciiDoc,
            "org" => OutputFormat::Org,
            "mediawiki" => OutputFormat::MediaWiki,
            "docbook" => OutputFormat::DocBook,
            "man" => OutputFormat::Man,
            "ms" => OutputFormat::Ms,
            "jats" => OutputFormat::Jats,
            "json" => OutputFormat::Json,
            "texinfo" => OutputFormat::Texinfo,
            "typst" => OutputFormat::Typst,
            _ => return Err(StyleError::unsupported_format(name)),
        };
        Ok(format)
    }

    /// Name used as the style bucket key and converter target.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Html4 => "html4",
            OutputFormat::Html5 => "html5",
            OutputFormat::Pdf => "pdf",
            OutputFormat::Latex => "latex",
            OutputFormat::Beamer => "beamer",
            OutputFormat::Context => "context",
            OutputFormat::Docx => "docx",
            OutputFormat::Odt => "odt",
            OutputFormat::Epub => "epub",
            OutputFormat::Epub2 => "epub2",
            OutputFormat::Epub3 => "epub3",
            OutputFormat::Markdown => "markdown",
            OutputFormat::Gfm => "gfm",
            OutputFormat::CommonMark => "commonmark",
            OutputFormat::Plain => "plain",
            OutputFormat::Rst => "rst",
            OutputFormat::Rtf => "rtf",
            OutputFormat::Pptx => "pptx",
            OutputFormat::RevealJs => "revealjs",
            OutputFormat::Slidy => "slidy",
            OutputFormat::AsciiDoc => "asciidoc",
            OutputFormat::Org => "org",
            OutputFormat::MediaWiki => "mediawiki",
            OutputFormat::DocBook => "docbook",
            OutputFormat::Man => "man",
            OutputFormat::Ms => "ms",
            OutputFormat::Jats => "jats",
            OutputFormat::Json => "json",
            OutputFormat::Texinfo => "texinfo",
            OutputFormat::Typst => "typst",
        }
    }

    /// File extension of the produced output.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Html
            | OutputFormat::Html4
            | OutputFormat::Html5
            | OutputFormat::RevealJs
            | OutputFormat::Slidy => "html",
            OutputFormat::Pdf | OutputFormat::Beamer => "pdf",
            OutputFormat::Latex | OutputFormat::Context => "tex",
            OutputFormat::Docx => "docx",
            OutputFormat::Odt => "odt",
            OutputFormat::Epub | OutputFormat::Epub2 | OutputFormat::Epub3 => "epub",
            OutputFormat::Markdown | OutputFormat::Gfm | OutputFormat::CommonMark => "md",
            OutputFormat::Plain => "txt",
            OutputFormat::Rst => "rst",
            OutputFormat::Rtf => "rtf",
            OutputFormat::Pptx => "pptx",
            OutputFormat::AsciiDoc => "adoc",
            OutputFormat::Org => "org",
            OutputFormat::MediaWiki => "wiki",
            OutputFormat::DocBook | OutputFormat::Jats => "xml",
            OutputFormat::Man => "1",
            OutputFormat::Ms => "ms",
            OutputFormat::Json => "json",
            OutputFormat::Texinfo => "texi",
            OutputFormat::Typst => "typ",
        }
    }

    /// Converter target mode for this format given the configured PDF engine.
    ///
    /// A LaTeX engine switches any format to `latex` mode, and so does `pdf`
    /// with no engine configured. Otherwise the format targets itself.
    pub fn effective_target(&self, pdf_engine: Option<&str>) -> &'static str {
        let engine = pdf_engine.unwrap_or_default();
        let pdf_default = engine.is_empty() && *self == OutputFormat::Pdf;
        if LATEX_ENGINES.contains(&engine) || pdf_default {
            OutputFormat::Latex.as_str()
        } else {
            self.as_str()
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_parse_round_trips_name() {
        for name in ["html", "pdf", "epub3", "revealjs", "commonmark"] {
            assert_eq!(OutputFormat::parse(name).unwrap().as_str(), name);
        }
        assert_eq!(OutputFormat::parse("HTML").unwrap(), OutputFormat::Html);
    }

    #[test]
    fn test_unknown_format_is_explicit_error() {
        let err = OutputFormat::parse("all").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedFormat);
        assert!(OutputFormat::parse("word97").is_err());
    }

    #[test]
    fn test_extension_table() {
        assert_eq!(OutputFormat::Latex.extension(), "tex");
        assert_eq!(OutputFormat::Markdown.extension(), "md");
        assert_eq!(OutputFormat::Epub3.extension(), "epub");
        assert_eq!(OutputFormat::Html5.extension(), "html");
    }

    #[test]
    fn test_effective_target() {
        assert_eq!(OutputFormat::Pdf.effective_target(None), "latex");
        assert_eq!(OutputFormat::Pdf.effective_target(Some("")), "latex");
        assert_eq!(OutputFormat::Pdf.effective_target(Some("xelatex")), "latex");
        assert_eq!(OutputFormat::Pdf.effective_target(Some("weasyprint")), "pdf");
        assert_eq!(OutputFormat::Html.effective_target(None), "html");
        assert_eq!(OutputFormat::Docx.effective_target(Some("")), "docx");
    }

    #[test]
    fn test_latex_engine_switches_any_format() {
        assert_eq!(OutputFormat::Html.effective_target(Some("xelatex")), "latex");
        assert_eq!(OutputFormat::Beamer.effective_target(Some("lualatex")), "latex");
        assert_eq!(OutputFormat::Html.effective_target(Some("wkhtmltopdf")), "html");
    }
}

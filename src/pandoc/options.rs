//! Long options the converter accepts directly from a configuration.

/// Configuration keys turned into `--key` / `--key=value` arguments.
pub const COMMAND_LINE_OPTIONS: &[&str] = &[
    // General options
    "f",
    "read",
    "t",
    "write",
    "output",
    "data-dir",
    "defaults",
    "verbose",
    "quiet",
    "fail-if-warnings",
    "log",
    // Reader options
    "shift-heading-level-by",
    "base-header-level",
    "strip-empty-paragraphs",
    "indented-code-classes",
    "default-image-extension",
    "file-scope",
    "filter",
    "lua-filter",
    "metadata-file",
    "preserve-tabs",
    "tab-stop",
    "track-changes",
    "extract-media",
    "abbreviations",
    // General writer options
    "standalone",
    "template",
    "variable",
    "eol",
    "dpi",
    "wrap",
    "columns",
    "toc",
    "toc-depth",
    "strip-comments",
    "no-highlight",
    "highlight-style",
    "syntax-definition",
    "include-in-header",
    "include-before-body",
    "include-after-body",
    "resource-path",
    "request-header",
    // Specific writers
    "self-contained",
    "embed-resources",
    "html-q-tags",
    "ascii",
    "reference-links",
    "reference-location",
    "atx-headers",
    "top-level-division",
    "number-sections",
    "number-offset",
    "listings",
    "incremental",
    "slide-level",
    "section-divs",
    "email-obfuscation",
    "id-prefix",
    "title-prefix",
    "css",
    "reference-doc",
    "epub-cover-image",
    "epub-metadata",
    "epub-embed-font",
    "epub-chapter-level",
    "epub-subdirectory",
    "ipynb-output",
    "pdf-engine",
    "pdf-engine-opt",
    // Citations
    "citeproc",
    "bibliography",
    "csl",
    "citation-abbreviations",
    "natbib",
    "biblatex",
    // Math in HTML
    "mathjax",
    "mathml",
    "webtex",
    "katex",
    "gladtex",
    // Wrapper scripts
    "dump-args",
    "ignore-args",
];

pub fn is_command_line_option(key: &str) -> bool {
    COMMAND_LINE_OPTIONS.contains(&key)
}

//! Source language detection by file extension

use std::path::Path;

/// Languages the walker picks up by default
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Rust,
    Python,
    JavaScript,
    TypeScript,
    Go,
    Java,
    Kotlin,
    Ruby,
    Php,
    C,
    Cpp,
    CSharp,
    Swift,
    Scala,
    Markdown,
    Unknown,
}

impl Language {
    pub const ALL: [Language; 15] = [
        Language::Rust,
        Language::Python,
        Language::JavaScript,
        Language::TypeScript,
        Language::Go,
        Language::Java,
        Language::Kotlin,
        Language::Ruby,
        Language::Php,
        Language::C,
        Language::Cpp,
        Language::CSharp,
        Language::Swift,
        Language::Scala,
        Language::Markdown,
    ];

    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "rs" => Language::Rust,
            "py" => Language::Python,
            "js" | "jsx" | "mjs" | "cjs" => Language::JavaScript,
            "ts" | "tsx" => Language::TypeScript,
            "go" => Language::Go,
            "java" => Language::Java,
            "kt" => Language::Kotlin,
            "rb" => Language::Ruby,
            "php" => Language::Php,
            "c" | "h" => Language::C,
            "cpp" | "hpp" => Language::Cpp,
            "cs" => Language::CSharp,
            "swift" => Language::Swift,
            "scala" => Language::Scala,
            "md" => Language::Markdown,
            _ => Language::Unknown,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(Language::Unknown)
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Language::Rust => &["rs"],
            Language::Python => &["py"],
            Language::JavaScript => &["js", "jsx", "mjs", "cjs"],
            Language::TypeScript => &["ts", "tsx"],
            Language::Go => &["go"],
            Language::Java => &["java"],
            Language::Kotlin => &["kt"],
            Language::Ruby => &["rb"],
            Language::Php => &["php"],
            Language::C => &["c", "h"],
            Language::Cpp => &["cpp", "hpp"],
            Language::CSharp => &["cs"],
            Language::Swift => &["swift"],
            Language::Scala => &["scala"],
            Language::Markdown => &["md"],
            Language::Unknown => &[],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::Rust => "Rust",
            Language::Python => "Python",
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
            Language::Go => "Go",
            Language::Java => "Java",
            Language::Kotlin => "Kotlin",
            Language::Ruby => "Ruby",
            Language::Php => "PHP",
            Language::C => "C",
            Language::Cpp => "C++",
            Language::CSharp => "C#",
            Language::Swift => "Swift",
            Language::Scala => "Scala",
            Language::Markdown => "Markdown",
            Language::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Every extension the built-in language table knows about
pub fn default_extensions() -> Vec<String> {
    Language::ALL
        .iter()
        .flat_map(|lang| lang.extensions().iter().map(|e| e.to_string()))
        .collect()
}

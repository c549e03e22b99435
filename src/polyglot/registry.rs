// src/polyglot/registry.rs

//! Canonical language registry and alias resolution.
//!
//! A language hint is lower-cased and trimmed, resolved through the alias
//! table, and must then name a registered profile. Unknown keys fail with
//! an error that enumerates the supported set in lexicographic order; that
//! enumeration is how callers discover valid languages.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::errors::{PfError, Result};
use crate::polyglot::profile::{
    BrowserProfile, CompileProfile, JvmProfile, LanguageProfile, ScriptProfile,
};

/// Many input spellings map to one canonical key.
const ALIASES: &[(&str, &str)] = &[
    // Shells
    ("shell", "bash"),
    ("shellscript", "bash"),
    ("zshell", "zsh"),
    ("fishshell", "fish"),
    ("dashshell", "dash"),
    ("powershell", "pwsh"),
    ("ps1", "pwsh"),
    // Python
    ("py", "python"),
    ("python3", "python"),
    ("ipython", "python"),
    // JavaScript / TypeScript
    ("javascript", "node"),
    ("js", "node"),
    ("nodejs", "node"),
    ("ts", "deno"),
    ("typescript", "deno"),
    ("tsnode", "ts-node"),
    // C-family
    ("c++", "cpp"),
    ("cxx", "cpp"),
    ("clang", "c"),
    ("clang++", "cpp"),
    ("g++", "cpp"),
    ("gcc", "c"),
    ("c-ir", "c-llvm"),
    ("c-ll", "c-llvm"),
    ("cpp-ir", "cpp-llvm"),
    ("cpp-ll", "cpp-llvm"),
    ("c-bc", "c-llvm-bc"),
    ("cpp-bc", "cpp-llvm-bc"),
    ("fortran-ll", "fortran-llvm"),
    ("fortran-ir", "fortran-llvm"),
    // Others
    ("golang", "go"),
    ("rb", "ruby"),
    ("pl", "perl"),
    ("ml", "ocaml"),
    ("hs", "haskell"),
    ("fortran90", "fortran"),
    ("gfortran", "fortran"),
    ("java", "java-openjdk"),
    ("java-android-google", "java-android"),
    ("android-java", "java-android"),
    ("asm86", "asm"),
    ("browser", "browser-js"),
    ("playwright", "browser-js"),
];

/// Registry of language profiles, keyed by canonical language key.
pub struct LanguageRegistry {
    profiles: BTreeMap<&'static str, Box<dyn LanguageProfile>>,
}

impl LanguageRegistry {
    /// The built-in registry, constructed once.
    pub fn builtin() -> &'static LanguageRegistry {
        static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();
        REGISTRY.get_or_init(LanguageRegistry::with_builtin_profiles)
    }

    fn with_builtin_profiles() -> Self {
        let mut profiles: BTreeMap<&'static str, Box<dyn LanguageProfile>> = BTreeMap::new();

        let mut script = |key: &'static str, parts: &[&str], ext: &'static str| {
            profiles.insert(key, Box::new(ScriptProfile::new(parts, ext)));
        };

        // Shells
        script("bash", &["bash"], ".sh");
        script("sh", &["sh"], ".sh");
        script("dash", &["dash"], ".sh");
        script("zsh", &["zsh"], ".sh");
        script("fish", &["fish"], ".fish");
        script("ksh", &["ksh"], ".sh");
        script("tcsh", &["tcsh"], ".csh");
        script("pwsh", &["pwsh", "-NoLogo", "-NonInteractive", "-File"], ".ps1");
        // Scripting / interpreted
        script("python", &["python3"], ".py");
        script("node", &["node"], ".js");
        script("deno", &["deno", "run"], ".ts");
        script("ts-node", &["ts-node"], ".ts");
        script("perl", &["perl"], ".pl");
        script("php", &["php"], ".php");
        script("ruby", &["ruby"], ".rb");
        script("r", &["Rscript"], ".R");
        script("julia", &["julia"], ".jl");
        script("haskell", &["runghc"], ".hs");
        script("ocaml", &["ocaml"], ".ml");
        script("elixir", &["elixir"], ".exs");
        script("dart", &["dart", "run"], ".dart");
        script("lua", &["lua"], ".lua");
        script("go", &["go", "run"], ".go");

        let mut compile = |key: &'static str, profile: CompileProfile| {
            profiles.insert(key, Box::new(profile));
        };

        // Compiled / AOT
        compile("rust", CompileProfile::new(".rs", "rustc {src} -o {bin}", "{bin}"));
        compile("c", CompileProfile::new(".c", "clang -x c {src} -o {bin}", "{bin}"));
        compile("cpp", CompileProfile::new(".cc", "clang++ {src} -o {bin}", "{bin}"));
        compile(
            "c-llvm",
            CompileProfile::new(
                ".c",
                "clang -x c -O3 -S -emit-llvm {src} -o {bin}.ll && cat {bin}.ll",
                "echo '(LLVM IR generated with O3 optimization)'",
            )
            .without_appended_args(),
        );
        compile(
            "cpp-llvm",
            CompileProfile::new(
                ".cc",
                "clang++ -O3 -S -emit-llvm {src} -o {bin}.ll && cat {bin}.ll",
                "echo '(LLVM IR generated with O3 optimization)'",
            )
            .without_appended_args(),
        );
        compile(
            "c-llvm-bc",
            CompileProfile::new(
                ".c",
                "clang -x c -O3 -c -emit-llvm {src} -o {bin}.bc && llvm-dis {bin}.bc -o {bin}.ll && cat {bin}.ll",
                "echo '(LLVM bitcode generated with O3 optimization)'",
            )
            .without_appended_args(),
        );
        compile(
            "cpp-llvm-bc",
            CompileProfile::new(
                ".cc",
                "clang++ -O3 -c -emit-llvm {src} -o {bin}.bc && llvm-dis {bin}.bc -o {bin}.ll && cat {bin}.ll",
                "echo '(LLVM bitcode generated with O3 optimization)'",
            )
            .without_appended_args(),
        );
        compile("fortran", CompileProfile::new(".f90", "gfortran {src} -o {bin}", "{bin}"));
        compile(
            "fortran-llvm",
            CompileProfile::new(
                ".f90",
                "flang -O3 {src} -S -emit-llvm -o {bin}.ll && cat {bin}.ll",
                "echo '(LLVM IR generated with O3 optimization)'",
            )
            .without_appended_args(),
        );
        compile("asm", CompileProfile::new(".s", "clang -x assembler {src} -o {bin}", "{bin}"));
        compile(
            "zig",
            CompileProfile::new(".zig", "zig build-exe -O Debug -femit-bin={bin} {src}", "{bin}"),
        );
        compile("nim", CompileProfile::new(".nim", "nim c -o:{bin} {src}", "{bin}"));
        compile("crystal", CompileProfile::new(".cr", "crystal build -o {bin} {src}", "{bin}"));
        compile("haskell-compile", CompileProfile::new(".hs", "ghc -o {bin} {src}", "{bin}"));
        compile("ocamlc", CompileProfile::new(".ml", "ocamlc -o {bin} {src}", "{bin}"));

        // JVM family
        profiles.insert("java-openjdk", Box::new(JvmProfile::openjdk()));
        profiles.insert("java-android", Box::new(JvmProfile::android()));

        // Browser scripting
        profiles.insert("browser-js", Box::new(BrowserProfile));

        Self { profiles }
    }

    /// Convert a language hint to its canonical key.
    ///
    /// The hint is trimmed and lower-cased, looked up in the alias table,
    /// and otherwise used as-is. Existence in the registry is checked by
    /// [`LanguageRegistry::profile`], not here.
    pub fn canonicalize(hint: &str) -> String {
        let key = hint.trim().to_lowercase();
        ALIASES
            .iter()
            .find(|(alias, _)| *alias == key)
            .map(|(_, canonical)| canonical.to_string())
            .unwrap_or(key)
    }

    /// Look up the profile for a canonical key, failing with the full
    /// supported-language enumeration when the key is unknown.
    pub fn profile(&self, canonical_key: &str, hint: &str) -> Result<&dyn LanguageProfile> {
        self.profiles
            .get(canonical_key)
            .map(Box::as_ref)
            .ok_or_else(|| PfError::Execution {
                message: format!(
                    "Language '{canonical_key}' (from '{hint}') has no builder registered"
                ),
                command: None,
                environment: Vec::new(),
                suggestion: Some(format!(
                    "Supported languages: {}",
                    self.supported_keys().collect::<Vec<_>>().join(", ")
                )),
            })
    }

    /// All canonical keys, lexicographically ordered.
    pub fn supported_keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.profiles.keys().copied()
    }

    /// Whether a hint resolves to a registered language.
    pub fn is_supported(hint: &str) -> bool {
        let key = Self::canonicalize(hint);
        Self::builtin().profiles.contains_key(key.as_str())
    }
}

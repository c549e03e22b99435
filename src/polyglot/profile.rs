// src/polyglot/profile.rs

//! Language profiles: how one language's toolchain turns a source snippet
//! into a self-contained shell payload.
//!
//! Every rendered payload creates its own temporary directory, stages the
//! snippet through a fenced here-document (so snippet content can never be
//! read as shell syntax), and removes the directory on every exit path.

use std::borrow::Cow;

/// Here-doc fence for staged snippets. Quoted at the `cat` site, so the
/// snippet body is never expanded by the shell.
pub const POLY_DELIM: &str = "__PFY_LANG__";

const DEFAULT_BASENAME: &str = "pf_poly";

/// One `render(source, args) -> script` operation per registered language.
///
/// New languages are added by registering a new profile instance, not by
/// branching inside a single function.
pub trait LanguageProfile: Send + Sync {
    fn render(&self, source: &str, args: &[String]) -> String;
}

/// Shell-quote trailing arguments, dropping empty ones.
pub fn quote_args(args: &[String]) -> String {
    args.iter()
        .filter(|a| !a.is_empty())
        .map(|a| shell_words::quote(a))
        .collect::<Vec<_>>()
        .join(" ")
}

fn ensure_newline(src: &str) -> Cow<'_, str> {
    if src.ends_with('\n') {
        Cow::Borrowed(src)
    } else {
        Cow::Owned(format!("{src}\n"))
    }
}

/// Interpreted languages: stage the snippet, invoke the interpreter on it,
/// forward shell-quoted arguments, propagate the exit code, clean up.
pub struct ScriptProfile {
    interpreter: String,
    ext: &'static str,
    basename: &'static str,
}

impl ScriptProfile {
    pub fn new(parts: &[&str], ext: &'static str) -> Self {
        Self {
            interpreter: shell_words::join(parts.iter().copied()),
            ext,
            basename: DEFAULT_BASENAME,
        }
    }
}

impl LanguageProfile for ScriptProfile {
    fn render(&self, source: &str, args: &[String]) -> String {
        let code = ensure_newline(source);
        let arg_str = quote_args(args);
        let arg_suffix = if arg_str.is_empty() {
            String::new()
        } else {
            format!(" {arg_str}")
        };

        format!(
            "tmpdir=$(mktemp -d)\n\
             src=\"$tmpdir/{basename}{ext}\"\n\
             cat <<'{delim}' > \"$src\"\n\
             {code}{delim}\n\
             chmod +x \"$src\" 2>/dev/null || true\n\
             {interpreter} \"$src\"{arg_suffix}\n\
             rc=$?\n\
             rm -rf \"$tmpdir\"\n\
             exit $rc\n",
            basename = self.basename,
            ext = self.ext,
            delim = POLY_DELIM,
            interpreter = self.interpreter,
        )
    }
}

/// Compiled languages: compile step templated over the staged paths, then
/// run the produced binary only if compilation succeeded.
///
/// Templates may use `{src}`, `{bin}`, `{dir}` placeholders; the run
/// template additionally understands `{args}`.
pub struct CompileProfile {
    ext: &'static str,
    compile_cmd: &'static str,
    run_cmd: &'static str,
    append_args: bool,
}

impl CompileProfile {
    pub fn new(ext: &'static str, compile_cmd: &'static str, run_cmd: &'static str) -> Self {
        Self {
            ext,
            compile_cmd,
            run_cmd,
            append_args: true,
        }
    }

    /// Diagnostic profiles (e.g. LLVM IR dumps) print instead of running a
    /// binary; trailing arguments make no sense there.
    pub fn without_appended_args(mut self) -> Self {
        self.append_args = false;
        self
    }
}

fn substitute_paths(template: &str) -> String {
    template
        .replace("{src}", "\"$src\"")
        .replace("{bin}", "\"$bin\"")
        .replace("{dir}", "\"$tmpdir\"")
}

impl LanguageProfile for CompileProfile {
    fn render(&self, source: &str, args: &[String]) -> String {
        let code = ensure_newline(source);
        let arg_str = quote_args(args);

        let compiler = substitute_paths(self.compile_cmd);
        let mut runner = substitute_paths(self.run_cmd).replace("{args}", &arg_str);
        if self.append_args && !arg_str.is_empty() {
            runner = format!("{runner} {arg_str}");
        }

        format!(
            "tmpdir=$(mktemp -d)\n\
             src=\"$tmpdir/{basename}{ext}\"\n\
             bin=\"$tmpdir/pf_poly_bin\"\n\
             cat <<'{delim}' > \"$src\"\n\
             {code}{delim}\n\
             {compiler}\n\
             rc=$?\n\
             if [ $rc -eq 0 ]; then\n\
             \x20\x20{runner}\n\
             \x20\x20rc=$?\n\
             fi\n\
             rm -rf \"$tmpdir\"\n\
             exit $rc\n",
            basename = DEFAULT_BASENAME,
            ext = self.ext,
            delim = POLY_DELIM,
        )
    }
}

/// JVM family: stage classes into a dedicated subdirectory and invoke the
/// classfile by its fixed entry-point name.
///
/// The Android variant additionally probes for an Android toolchain (SDK
/// discovery via environment variables, `d8` dexing, `dalvikvm` execution)
/// before falling back to a plain JVM run.
pub struct JvmProfile {
    android_toolchain: bool,
}

impl JvmProfile {
    pub fn openjdk() -> Self {
        Self {
            android_toolchain: false,
        }
    }

    pub fn android() -> Self {
        Self {
            android_toolchain: true,
        }
    }
}

impl LanguageProfile for JvmProfile {
    fn render(&self, source: &str, args: &[String]) -> String {
        let code = ensure_newline(source);
        let arg_str = quote_args(args);
        let arg_suffix = if arg_str.is_empty() {
            String::new()
        } else {
            format!(" {arg_str}")
        };

        if !self.android_toolchain {
            return format!(
                "tmpdir=$(mktemp -d)\n\
                 src=\"$tmpdir/Main.java\"\n\
                 classes=\"$tmpdir/classes\"\n\
                 mkdir -p \"$classes\"\n\
                 cat <<'{delim}' > \"$src\"\n\
                 {code}{delim}\n\
                 javac -d \"$classes\" \"$src\"\n\
                 rc=$?\n\
                 if [ $rc -eq 0 ]; then\n\
                 \x20\x20(cd \"$classes\" && java Main{arg_suffix})\n\
                 \x20\x20rc=$?\n\
                 fi\n\
                 rm -rf \"$tmpdir\"\n\
                 exit $rc\n",
                delim = POLY_DELIM,
            );
        }

        format!(
            "tmpdir=$(mktemp -d)\n\
             src=\"$tmpdir/Main.java\"\n\
             classes=\"$tmpdir/classes\"\n\
             dexdir=\"$tmpdir/dex\"\n\
             mkdir -p \"$classes\" \"$dexdir\"\n\
             cat <<'{delim}' > \"$src\"\n\
             {code}{delim}\n\
             \n\
             ANDROID_SDK=\"${{ANDROID_SDK_ROOT:-${{ANDROID_HOME:-}}}}\"\n\
             platform_jar=\"${{ANDROID_PLATFORM_JAR:-}}\"\n\
             if [ -z \"$platform_jar\" ] && [ -n \"$ANDROID_SDK\" ]; then\n\
             \x20\x20latest_platform=$(ls -1 \"$ANDROID_SDK/platforms\" 2>/dev/null | sort -V | tail -1)\n\
             \x20\x20if [ -n \"$latest_platform\" ] && [ -f \"$ANDROID_SDK/platforms/$latest_platform/android.jar\" ]; then\n\
             \x20\x20\x20\x20platform_jar=\"$ANDROID_SDK/platforms/$latest_platform/android.jar\"\n\
             \x20\x20fi\n\
             fi\n\
             javac_cp=\"\"\n\
             if [ -n \"$platform_jar\" ] && [ -f \"$platform_jar\" ]; then\n\
             \x20\x20javac_cp=\"-classpath $platform_jar\"\n\
             fi\n\
             javac $javac_cp -d \"$classes\" \"$src\"\n\
             rc=$?\n\
             if [ $rc -ne 0 ]; then\n\
             \x20\x20rm -rf \"$tmpdir\"\n\
             \x20\x20exit $rc\n\
             fi\n\
             \n\
             d8_bin=\"${{ANDROID_D8:-}}\"\n\
             if [ -z \"$d8_bin\" ] && [ -n \"$ANDROID_SDK\" ]; then\n\
             \x20\x20latest_bt=$(ls -1 \"$ANDROID_SDK/build-tools\" 2>/dev/null | sort -V | tail -1)\n\
             \x20\x20if [ -n \"$latest_bt\" ] && [ -x \"$ANDROID_SDK/build-tools/$latest_bt/d8\" ]; then\n\
             \x20\x20\x20\x20d8_bin=\"$ANDROID_SDK/build-tools/$latest_bt/d8\"\n\
             \x20\x20fi\n\
             fi\n\
             \n\
             if [ -n \"$d8_bin\" ] && command -v dalvikvm >/dev/null 2>&1; then\n\
             \x20\x20\"$d8_bin\" --output \"$dexdir\" \"$classes\" >/dev/null\n\
             \x20\x20rc=$?\n\
             \x20\x20if [ $rc -eq 0 ]; then\n\
             \x20\x20\x20\x20dalvikvm -cp \"$dexdir/classes.dex\" Main{arg_suffix}\n\
             \x20\x20\x20\x20rc=$?\n\
             \x20\x20\x20\x20rm -rf \"$tmpdir\"\n\
             \x20\x20\x20\x20exit $rc\n\
             \x20\x20fi\n\
             fi\n\
             \n\
             (cd \"$classes\" && java Main{arg_suffix})\n\
             rc=$?\n\
             rm -rf \"$tmpdir\"\n\
             exit $rc\n",
            delim = POLY_DELIM,
        )
    }
}

/// Browser scripting: wrap the snippet inside an async Playwright driver
/// that launches a headless browser context (headful when `PF_HEADFUL` is
/// set), executes the snippet, and always tears the context down. Any
/// in-script exception becomes a non-zero process exit.
pub struct BrowserProfile;

impl LanguageProfile for BrowserProfile {
    fn render(&self, source: &str, args: &[String]) -> String {
        let code = ensure_newline(source);
        let arg_str = quote_args(args);
        let arg_suffix = if arg_str.is_empty() {
            String::new()
        } else {
            format!(" {arg_str}")
        };

        let snippet: String = code.lines().map(|l| format!("  {l}\n")).collect();

        let body = format!(
            "const {{ chromium }} = require('playwright');\n\
             (async () => {{\n\
             \x20\x20const browser = await chromium.launch({{ headless: process.env.PF_HEADFUL ? false : true }});\n\
             \x20\x20const page = await browser.newPage();\n\
             {snippet}\
             \x20\x20await browser.close();\n\
             }})().catch(err => {{\n\
             \x20\x20console.error(err);\n\
             \x20\x20process.exit(1);\n\
             }});\n"
        );

        format!(
            "tmpdir=$(mktemp -d)\n\
             src=\"$tmpdir/pf_poly_browser.mjs\"\n\
             cat <<'{delim}' > \"$src\"\n\
             {body}{delim}\n\
             node \"$src\"{arg_suffix}\n\
             rc=$?\n\
             rm -rf \"$tmpdir\"\n\
             exit $rc\n",
            delim = POLY_DELIM,
        )
    }
}

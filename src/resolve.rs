//! Type resolution from source type text to emitted type expressions.
//!
//! Operates on the confined type surface already produced by a real type
//! system, so string rewriting over the text is sufficient. The resolver
//! never fails: expressions it cannot understand degrade to `any`.

use crate::model::ResolvedType;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static QUALIFIED_RE: Lazy<Regex> = Lazy::new(|| {
    // `<module-path>.<Symbol>` — the module path may itself be dotted.
    Regex::new(r"([A-Za-z_$][\w$]*(?:\.[A-Za-z_$][\w$]*)*)\.([A-Za-z_$][\w$]*)")
        .expect("qualified reference pattern")
});

static ARRAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Array<([^<>]+)>").expect("array pattern"));

static WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z_$][\w$]*").expect("identifier pattern"));

/// Resolves textual type expressions to target-language types plus the
/// symbols they require from the shared types module.
#[derive(Debug, Clone)]
pub struct TypeResolver {
    /// Module alias that qualifies references into the shared types module.
    types_alias: String,

    /// Suffixes marking bare names as data objects.
    dto_suffixes: Vec<String>,
}

impl TypeResolver {
    pub fn new(types_alias: impl Into<String>, dto_suffixes: Vec<String>) -> Self {
        Self {
            types_alias: types_alias.into(),
            dto_suffixes,
        }
    }

    /// Resolve a type expression.
    ///
    /// `available` is the set of symbols already imported by the source
    /// file; only those may enter the import set. Symbols that are not
    /// locally imported stay in the expression but are never re-imported.
    pub fn resolve(&self, type_text: &str, available: &[String]) -> ResolvedType {
        let mut text = collapse_whitespace(type_text);
        if text.is_empty() {
            return ResolvedType::any();
        }

        // The deferred wrapper never leaks into emitted code; the client
        // layer supplies its own asynchronous wrapper.
        while let Some(inner) = strip_wrapper(&text, "Promise") {
            text = inner;
        }

        if text == "unknown" || text == "any" {
            return ResolvedType::any();
        }

        // Array<T> normalizes to T[], innermost first.
        loop {
            let rewritten = ARRAY_RE.replace_all(&text, "$1[]").into_owned();
            if rewritten == text {
                break;
            }
            text = rewritten;
        }

        // Qualified references into the shared types module become bare
        // symbols; references into any other module poison the expression.
        let mut imports: Vec<String> = Vec::new();
        let mut foreign = false;
        let mut qualified = false;
        let rewritten = QUALIFIED_RE.replace_all(&text, |caps: &Captures| {
            let module = &caps[1];
            let symbol = &caps[2];
            if module == self.types_alias {
                qualified = true;
                if available.iter().any(|a| a == symbol) && !imports.iter().any(|i| i == symbol) {
                    imports.push(symbol.to_string());
                }
                symbol.to_string()
            } else {
                foreign = true;
                caps[0].to_string()
            }
        });
        if foreign {
            return ResolvedType::any();
        }
        let text = rewritten.into_owned();

        // Bare data-object names, only when no qualified reference claimed
        // the expression. Covers Omit<X, K> / Partial<X> wrappers (kept
        // verbatim), arrays and unions of data objects.
        if !qualified {
            for m in WORD_RE.find_iter(&text) {
                let word = m.as_str();
                if self.is_dto_name(word)
                    && available.iter().any(|a| a == word)
                    && !imports.iter().any(|i| i == word)
                {
                    imports.push(word.to_string());
                }
            }
        }

        ResolvedType {
            expression: text,
            import_names: imports,
        }
    }

    fn is_dto_name(&self, word: &str) -> bool {
        self.dto_suffixes
            .iter()
            .any(|suffix| word.len() > suffix.len() && word.ends_with(suffix.as_str()))
    }
}

/// Strip an outer `Name<...>` wrapper, returning the inner text.
fn strip_wrapper(text: &str, name: &str) -> Option<String> {
    let rest = text.strip_prefix(name)?.strip_prefix('<')?;
    let inner = rest.strip_suffix('>')?;
    // Reject when the matched angle brackets are not a balanced pair, as in
    // `Promise<A> | Promise<B>`.
    let mut depth = 0i32;
    for ch in inner.chars() {
        match ch {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            _ => {}
        }
    }
    (depth == 0).then(|| inner.trim().to_string())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

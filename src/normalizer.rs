use regex::Regex;

/// Canonicalizes product titles and queries into a comparable token form.
///
/// Lowercases, then strips brand tokens, weights/volumes, counts/packaging and
/// bracketed text before collapsing whitespace. Stripping is repeated until the
/// text stops changing, so removing one pattern can never leave behind another
/// (e.g. `"1(a)kg"` loses both the parentheses and the resulting `"1kg"`).
#[derive(Debug, Clone)]
pub struct TitleNormalizer {
    brands: Vec<Regex>,
    unit: Regex,
    count: Regex,
    multiplier: Regex,
    parens: Regex,
    brackets: Regex,
    whitespace: Regex,
}

impl TitleNormalizer {
    pub fn new<S: AsRef<str>>(brand_tokens: &[S]) -> Self {
        let brands = brand_tokens
            .iter()
            .map(|b| b.as_ref().trim())
            .filter(|b| !b.is_empty())
            .map(|b| whole_word(b))
            .collect();

        Self {
            brands,
            unit: Regex::new(r"(?i)\d+(?:\.\d+)?\s*(?:kg|g|ml|l|킬로그램|그램|리터)\b")
                .expect("unit pattern"),
            count: Regex::new(r"(?i)\d+\s*(?:개입|개|봉지|봉|입|팩|박스|box|pack|pcs|ea|x)\b")
                .expect("count pattern"),
            multiplier: Regex::new(r"(?i)x\s*\d+").expect("multiplier pattern"),
            parens: Regex::new(r"\([^)]*\)").expect("parens pattern"),
            brackets: Regex::new(r"\[[^\]]*\]").expect("brackets pattern"),
            whitespace: Regex::new(r"\s+").expect("whitespace pattern"),
        }
    }

    pub fn normalize(&self, name: &str) -> String {
        let mut current = name.to_lowercase();
        loop {
            let next = self.strip_once(&current);
            if next == current {
                return next;
            }
            current = next;
        }
    }

    fn strip_once(&self, text: &str) -> String {
        let mut out = text.to_string();
        for brand in &self.brands {
            out = brand.replace_all(&out, "").into_owned();
        }
        out = self.unit.replace_all(&out, "").into_owned();
        out = self.count.replace_all(&out, "").into_owned();
        out = self.multiplier.replace_all(&out, "").into_owned();
        out = self.parens.replace_all(&out, "").into_owned();
        out = self.brackets.replace_all(&out, "").into_owned();
        out = self.whitespace.replace_all(&out, " ").into_owned();
        out.trim().to_string()
    }
}

// Escaped input always yields a valid pattern.
fn whole_word(token: &str) -> Regex {
    Regex::new(&format!(r"(?i)\b{}\b", regex::escape(token))).expect("escaped brand pattern")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchConfig;
    use proptest::prelude::*;

    fn normalizer() -> TitleNormalizer {
        TitleNormalizer::new(&MatchConfig::default().brand_tokens)
    }

    #[test]
    fn removes_weight() {
        let out = normalizer().normalize("신라면 120g");
        assert_eq!(out, "신라면");
    }

    #[test]
    fn removes_counts() {
        let n = normalizer();
        assert_eq!(n.normalize("신라면 5개입"), "신라면");
        assert_eq!(n.normalize("신라면 봉지 5개"), "신라면 봉지");
        assert_eq!(n.normalize("신라면 120g x5"), "신라면");
    }

    #[test]
    fn removes_brand_case_insensitively() {
        let n = TitleNormalizer::new(&["BrandX"]);
        assert_eq!(n.normalize("BRANDX widget"), "widget");
        assert_eq!(n.normalize("brandxy widget"), "brandxy widget");
        assert_eq!(normalizer().normalize("농심 신라면"), "신라면");
        assert_eq!(normalizer().normalize("Nongshim Shin Ramyun"), "shin ramyun");
    }

    #[test]
    fn removes_bracketed_text() {
        let n = normalizer();
        assert_eq!(n.normalize("신라면 (매운맛)"), "신라면");
        assert_eq!(n.normalize("[무료배송] 신라면"), "신라면");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(normalizer().normalize("  신라면   120g   5개 "), "신라면");
        assert_eq!(normalizer().normalize("짜파 \t 게티"), "짜파 게티");
    }

    #[test]
    fn pattern_revealed_by_stripping_is_removed() {
        assert_eq!(normalizer().normalize("신라면 1(특가)kg"), "신라면");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(normalizer().normalize(""), "");
        assert_eq!(normalizer().normalize("농심 (x)"), "");
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(s in "[a-zA-Z0-9가-힣농심오뚜기 ()\\[\\]xX\t]{0,40}") {
            let n = normalizer();
            let once = n.normalize(&s);
            prop_assert_eq!(n.normalize(&once), once);
        }

        #[test]
        fn configured_brand_never_survives(prefix in "[a-z가-힣 ]{0,10}", suffix in "[a-z가-힣 ]{0,10}") {
            let n = TitleNormalizer::new(&["BrandX"]);
            let out = n.normalize(&format!("{} BrandX {}", prefix, suffix));
            let standalone = out.split(' ').any(|w| w == "brandx");
            prop_assert!(!standalone);
        }
    }
}

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::debug;

use super::editions::EditionTable;
use crate::model::{Condition, Extra, Language, NormalizedItem, RawItem};
use crate::util::collapse_whitespace;

/// One `(category, pattern)` entry of an ordered rule list.
#[derive(Debug, Clone)]
pub struct Rule<C> {
    category: C,
    pattern: Regex,
}

impl<C: Copy> Rule<C> {
    fn new(category: C, pattern: &str) -> Result<Self> {
        Ok(Self {
            category,
            pattern: Regex::new(pattern)
                .with_context(|| format!("failed to compile classification rule {pattern}"))?,
        })
    }

    pub fn category(&self) -> C {
        self.category
    }

    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

pub fn first_match<C: Copy>(rules: &[Rule<C>], text: &str) -> Option<C> {
    rules
        .iter()
        .find(|rule| rule.matches(text))
        .map(Rule::category)
}

// Bare codes only count when they are the whole annotation, so short tokens
// such as "de" or "it" inside set names never classify a row.
pub fn language_rules() -> Result<Vec<Rule<Language>>> {
    Ok(vec![
        Rule::new(Language::Phyrexian, r"(?i:\bphyrexian[oa]?\b)|^PH$")?,
        Rule::new(Language::Portuguese, r"(?i:\bportugu[eê]se?\b)|^(?:PT|PT-BR|PTBR)$")?,
        Rule::new(Language::English, r"(?i:\bingl[eê]s\b|\benglish\b)|^(?:EN|ENG)$")?,
        Rule::new(Language::Japanese, r"(?i:\bjapon[eê]s\b|\bjapanese\b)|^(?:JP|JA|JPN)$")?,
        Rule::new(Language::German, r"(?i:\balem[aã]o\b|\bgerman\b)|^(?:DE|GER)$")?,
        Rule::new(Language::Chinese, r"(?i:\bchin[eê]s\b|\bchinese\b)|^(?:ZH|CN|CHN)$")?,
        Rule::new(Language::Spanish, r"(?i:\bespanhol\b|\bspanish\b)|^ES$")?,
        Rule::new(Language::French, r"(?i:\bfranc[eê]s\b|\bfrench\b)|^FR$")?,
        Rule::new(Language::Italian, r"(?i:\bitalian[oa]?\b)|^IT$")?,
        Rule::new(Language::Korean, r"(?i:\bcorean[oa]\b|\bkorean\b)|^(?:KO|KR)$")?,
        Rule::new(Language::Russian, r"(?i:\bruss[oa]\b|\brussian\b)|^RU$")?,
    ])
}

// Near Mint precedes Mint: "Near Mint" and "Praticamente Nova" contain Mint's labels.
pub fn condition_rules() -> Result<Vec<Rule<Condition>>> {
    Ok(vec![
        Rule::new(
            Condition::NearMint,
            r"\(NM\)|^NM$|(?i:\bnear[\s-]?mint\b|\bpraticamente nov[oa]\b)",
        )?,
        Rule::new(
            Condition::SlightlyPlayed,
            r"\(SP\)|^SP$|(?i:\bslightly played\b|\busad[oa] levemente\b|\blevemente usad[oa]\b)",
        )?,
        Rule::new(
            Condition::ModeratelyPlayed,
            r"\(MP\)|^MP$|(?i:\bmoderately played\b|\busad[oa] moderadamente\b)",
        )?,
        Rule::new(
            Condition::HeavilyPlayed,
            r"\(HP\)|^HP$|(?i:\bheavily played\b|\bmuito usad[oa]\b)",
        )?,
        Rule::new(
            Condition::Damaged,
            r"\(D\)|^D$|(?i:\bdamaged\b|\bdanificad[oa]\b)",
        )?,
        Rule::new(Condition::Used, r"(?i:^usad[oa]s?$|^used$)")?,
        Rule::new(Condition::Mint, r"\(M\)|^M$|(?i:^mint$|^nov[oa]$)")?,
        Rule::new(Condition::Sealed, r"(?i:\bsealed\b|\blacrad[oa]\b)")?,
        Rule::new(Condition::Opened, r"(?i:\bopened\b|\babert[oa]\b)")?,
    ])
}

pub fn extra_rules() -> Result<Vec<Rule<Extra>>> {
    Ok(vec![
        Rule::new(Extra::Foil, r"(?i)\bfoil\b")?,
        Rule::new(Extra::Promo, r"(?i)\bpromo\w*")?,
        Rule::new(Extra::PreRelease, r"(?i)\bpr[eé][\s-]?release\b")?,
    ])
}

#[derive(Debug, Default)]
struct Findings {
    language: Option<Language>,
    condition: Option<Condition>,
    extras: BTreeSet<Extra>,
}

pub struct Classifier {
    languages: Vec<Rule<Language>>,
    conditions: Vec<Rule<Condition>>,
    extras: Vec<Rule<Extra>>,
    title_annotation: Regex,
    editions: EditionTable,
}

impl Classifier {
    pub fn new(editions: EditionTable) -> Result<Self> {
        Ok(Self {
            languages: language_rules()?,
            conditions: condition_rules()?,
            extras: extra_rules()?,
            title_annotation: Regex::new(r"\(([^()]*)\)|\[([^\[\]]*)\]")
                .context("failed to compile title annotation regex")?,
            editions,
        })
    }

    pub fn classify(&self, raw: &RawItem) -> NormalizedItem {
        let mut findings = Findings::default();

        let mut stripped = String::with_capacity(raw.title.len());
        let mut cursor = 0;
        for captures in self.title_annotation.captures_iter(&raw.title) {
            let Some(whole) = captures.get(0) else {
                continue;
            };
            let inner = captures
                .get(1)
                .or_else(|| captures.get(2))
                .map(|inner| inner.as_str())
                .unwrap_or_default();

            if self.scan(inner, &mut findings) {
                stripped.push_str(&raw.title[cursor..whole.start()]);
                stripped.push(' ');
                cursor = whole.end();
            }
        }
        stripped.push_str(&raw.title[cursor..]);

        let mut edition_label = None;
        for description in &raw.descriptions {
            if !self.scan(description, &mut findings) && edition_label.is_none() {
                edition_label = Some(description.as_str());
            }
        }

        let edition = edition_label
            .map(|label| self.editions.normalize(label))
            .unwrap_or_default();

        let item = NormalizedItem {
            name: tidy_name(&stripped),
            english_name: raw.subtitle.clone(),
            edition,
            language: findings.language.unwrap_or(Language::Unknown),
            condition: findings.condition.unwrap_or(Condition::Unknown),
            extras: findings.extras,
            quantity: raw.quantity,
            unit_price: raw.unit_price,
            link: raw.link.clone(),
        };

        debug!(
            position = raw.position,
            name = %item.name,
            edition = %item.edition,
            language = item.language.as_str(),
            condition = item.condition.as_str(),
            extras = %item.extras_label(),
            "classified cart row"
        );

        item
    }

    /// Records every category `text` matches; first language and condition win.
    fn scan(&self, text: &str, findings: &mut Findings) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }

        let mut matched = false;

        if let Some(language) = first_match(&self.languages, text) {
            findings.language.get_or_insert(language);
            matched = true;
        }

        if let Some(condition) = first_match(&self.conditions, text) {
            findings.condition.get_or_insert(condition);
            matched = true;
        }

        for rule in &self.extras {
            if rule.matches(text) {
                findings.extras.insert(rule.category());
                matched = true;
            }
        }

        matched
    }
}

fn tidy_name(raw: &str) -> String {
    collapse_whitespace(raw)
        .trim_matches(|ch: char| {
            ch.is_whitespace() || matches!(ch, '-' | '–' | '—' | ',' | ';' | ':' | '/' | '|')
        })
        .to_string()
}

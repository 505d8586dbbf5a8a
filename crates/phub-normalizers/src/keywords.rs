//! Bilingual (English/Korean) keyword heuristics over facility tokens and
//! detail-block labels. The lists are fixed; unmatched phrasing is a miss.

use once_cell::sync::Lazy;
use regex::Regex;

pub(crate) static PARKING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)parking|주차").expect("valid parking regex"));
pub(crate) static LANGUAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)korean|english|japanese|chinese|한국어|영어|일본어|중국어")
        .expect("valid language regex")
});
pub(crate) static DINING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)restaurant|cafe|café|bar|레스토랑|카페|바").expect("valid dining regex")
});
pub(crate) static BREAKFAST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)breakfast|조식").expect("valid breakfast regex"));

pub(crate) static POLICY_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)취소|확인사항|애견|반려|인원|cancel|confirm|\bpets?\b|occupan")
        .expect("valid policy label regex")
});
pub(crate) static PET_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)애견|반려|\bpets?\b").expect("valid pet label regex"));
pub(crate) static BASIC_INFO_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)기본정보|basic\s*info").expect("valid basic info regex"));
pub(crate) static FACILITY_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)부대시설|facilit|amenit").expect("valid facility label regex"));

pub(crate) static TRANSPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"역|교통|셔틀|분|km|m").expect("valid transport regex"));

pub(crate) static CHECK_IN_OUT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:체크인|check-?in)\s*:\s*([^|]+)\|\s*(?:체크아웃|check-?out)\s*:\s*([^|]+)")
        .expect("valid check-in regex")
});

static TOKEN_DELIMITERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[•·,、，]").expect("valid delimiter regex"));

/// Splits free text on bullet, middle-dot and comma-family delimiters.
pub(crate) fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    TOKEN_DELIMITERS
        .split(text)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(ToString::to_string)
}

/// `(check_in, check_out)` from a "check-in : X | check-out : Y" line.
pub(crate) fn check_in_out(text: &str) -> Option<(String, String)> {
    let caps = CHECK_IN_OUT.captures(text)?;
    Some((caps[1].trim().to_string(), caps[2].trim().to_string()))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FacilityFacts {
    pub parking: bool,
    pub breakfast: bool,
    pub languages: Vec<String>,
    pub on_site_dining: Vec<String>,
}

impl FacilityFacts {
    pub fn from_facilities(facilities: &[String]) -> Self {
        let matching = |re: &Regex| {
            facilities
                .iter()
                .filter(|f| re.is_match(f))
                .cloned()
                .collect::<Vec<_>>()
        };
        Self {
            parking: facilities.iter().any(|f| PARKING.is_match(f)),
            breakfast: facilities.iter().any(|f| BREAKFAST.is_match(f)),
            languages: matching(&LANGUAGE),
            on_site_dining: matching(&DINING),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn tokenizer_splits_on_bullets_and_commas() {
        let tokens = tokenize("무료 Wi-Fi • 주차 가능·피트니스, 사우나、 수영장").collect::<Vec<_>>();
        assert_eq!(tokens, strings(&["무료 Wi-Fi", "주차 가능", "피트니스", "사우나", "수영장"]));
        assert_eq!(tokenize(" , • ").count(), 0);
    }

    #[test]
    fn facts_match_either_language() {
        let facts = FacilityFacts::from_facilities(&strings(&[
            "Free Parking",
            "한국어 가능",
            "English speaking staff",
            "Rooftop Bar",
            "레스토랑",
            "Pool",
        ]));
        assert!(facts.parking);
        assert!(!facts.breakfast);
        assert_eq!(facts.languages, strings(&["한국어 가능", "English speaking staff"]));
        assert_eq!(facts.on_site_dining, strings(&["Rooftop Bar", "레스토랑"]));

        let korean = FacilityFacts::from_facilities(&strings(&["주차장", "조식 뷔페"]));
        assert!(korean.parking);
        assert!(korean.breakfast);
    }

    #[test]
    fn check_in_template_is_bilingual() {
        assert_eq!(
            check_in_out("체크인 : 15:00 | 체크아웃 : 11:00"),
            Some(("15:00".to_string(), "11:00".to_string()))
        );
        assert_eq!(
            check_in_out("Check-in: 3 PM | Check-out: noon"),
            Some(("3 PM".to_string(), "noon".to_string()))
        );
        assert_eq!(check_in_out("체크인 15시"), None);
    }

    #[test]
    fn pet_labels_are_policy_labels() {
        for title in ["반려동물 안내", "애견 동반", "Pets allowed", "Pet policy"] {
            assert!(POLICY_LABEL.is_match(title), "{title}");
            assert!(PET_LABEL.is_match(title), "{title}");
        }
        assert!(!POLICY_LABEL.is_match("Carpet cleaning"));
        assert!(!PET_LABEL.is_match("Carpet cleaning"));
    }

    #[test]
    fn labels_route_detail_blocks() {
        assert!(POLICY_LABEL.is_match("취소 및 환불 규정"));
        assert!(POLICY_LABEL.is_match("Pet policy"));
        assert!(PET_LABEL.is_match("애견 동반 안내"));
        assert!(BASIC_INFO_LABEL.is_match("기본정보"));
        assert!(FACILITY_LABEL.is_match("부대시설 안내"));
        assert!(!POLICY_LABEL.is_match("조식 안내"));
        assert!(TRANSPORT.is_match("강남역 도보 5분"));
        assert!(TRANSPORT.is_match("Airport bus stop 300 m"));
        assert!(TRANSPORT.is_match("Namsan Tower"));
        assert!(!TRANSPORT.is_match("롯데월드타워 인접"));
    }
}

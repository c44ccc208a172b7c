use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::field::PlanetField;
use crate::domain::NormalizedPlanet;
use crate::error::QueryError;

pub const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl FromStr for SortDirection {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            _ => Err(QueryError::InvalidValue {
                field: "direction".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => f.write_str("asc"),
            SortDirection::Descending => f.write_str("desc"),
        }
    }
}

/// Sort key, direction and page window for a listing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRequest {
    pub sort_by: PlanetField,
    pub direction: SortDirection,
    page_size: usize,
    pub page: usize,
}

impl PageRequest {
    pub fn new(page_size: usize, page: usize) -> Result<Self, QueryError> {
        if page_size == 0 {
            return Err(QueryError::InvalidPageSize);
        }
        Ok(Self {
            sort_by: PlanetField::Name,
            direction: SortDirection::Ascending,
            page_size,
            page,
        })
    }

    pub fn sorted_by(mut self, field: PlanetField, direction: SortDirection) -> Self {
        self.sort_by = field;
        self.direction = direction;
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            sort_by: PlanetField::Name,
            direction: SortDirection::Ascending,
            page_size: DEFAULT_PAGE_SIZE,
            page: 0,
        }
    }
}

/// One page of matching planets, borrowed from the generation it was read from.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult<'a> {
    pub planets: Vec<&'a NormalizedPlanet>,
    /// Matches across all pages
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub sort_by: PlanetField,
    pub direction: SortDirection,
    /// Human-readable form of the applied filter
    pub filter: String,
}

impl QueryResult<'_> {
    pub fn names(&self) -> Vec<&str> {
        self.planets.iter().map(|p| p.name.as_str()).collect()
    }
}

/// Stable order on `field`: unknown values last in either direction, ties
/// broken by name ascending.
pub fn compare_by(
    field: PlanetField,
    direction: SortDirection,
    a: &NormalizedPlanet,
    b: &NormalizedPlanet,
) -> Ordering {
    let (va, vb) = (field.value(a), field.value(b));
    let primary = match (va.is_missing(), vb.is_missing()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => match direction {
            SortDirection::Ascending => va.compare(&vb),
            SortDirection::Descending => vb.compare(&va),
        },
    };
    primary.then_with(|| a.name.cmp(&b.name))
}

/// Sort `matches` and cut out the requested page. A page past the end is empty.
pub fn paginate<'a>(
    mut matches: Vec<&'a NormalizedPlanet>,
    request: &PageRequest,
    filter: String,
) -> QueryResult<'a> {
    matches.sort_by(|a, b| compare_by(request.sort_by, request.direction, a, b));
    let total = matches.len();
    let start = request.page.saturating_mul(request.page_size).min(total);
    let end = start.saturating_add(request.page_size).min(total);

    QueryResult {
        planets: matches[start..end].to_vec(),
        total,
        page: request.page,
        page_size: request.page_size,
        total_pages: total.div_ceil(request.page_size),
        sort_by: request.sort_by,
        direction: request.direction,
        filter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Measure;

    fn planets() -> Vec<NormalizedPlanet> {
        let mut out = Vec::new();
        for (name, year) in [("c", Some(2010)), ("a", Some(2010)), ("b", None), ("d", Some(2020))] {
            let mut p = NormalizedPlanet::new(name);
            p.discovery_year = Measure::from(year);
            out.push(p);
        }
        out
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        assert_eq!(PageRequest::new(0, 0), Err(QueryError::InvalidPageSize));
    }

    #[test]
    fn test_unknowns_sort_last_both_ways() {
        let all = planets();
        let refs: Vec<_> = all.iter().collect();

        let asc = PageRequest::new(10, 0)
            .unwrap()
            .sorted_by(PlanetField::DiscoveryYear, SortDirection::Ascending);
        assert_eq!(paginate(refs.clone(), &asc, String::new()).names(), vec!["a", "c", "d", "b"]);

        let desc = asc.sorted_by(PlanetField::DiscoveryYear, SortDirection::Descending);
        assert_eq!(paginate(refs, &desc, String::new()).names(), vec!["d", "a", "c", "b"]);
    }

    #[test]
    fn test_page_window() {
        let all = planets();
        let refs: Vec<_> = all.iter().collect();
        let second = PageRequest::new(3, 1).unwrap();
        let result = paginate(refs.clone(), &second, String::new());
        assert_eq!(result.names(), vec!["d"]);
        assert_eq!(result.total, 4);
        assert_eq!(result.total_pages, 2);

        let beyond = PageRequest::new(3, 7).unwrap();
        assert!(paginate(refs, &beyond, String::new()).planets.is_empty());
    }

    #[test]
    fn test_direction_parses() {
        assert_eq!("DESC".parse::<SortDirection>().unwrap(), SortDirection::Descending);
        assert!("sideways".parse::<SortDirection>().is_err());
    }
}

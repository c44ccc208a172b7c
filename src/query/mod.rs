// Read-only query engine over one published catalog generation

pub mod field;
pub mod filter;
pub mod page;
pub mod series;
pub mod stats;

use chrono::{Datelike, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument, warn};

use crate::config::CategoryConfig;
use crate::domain::NormalizedPlanet;
use crate::error::QueryError;
use crate::observability::metrics;
use crate::pipeline::storage::Generation;

pub use field::{FieldKind, FieldValue, PlanetField};
pub use filter::{Category, ExactValue, Predicate};
pub use page::{PageRequest, QueryResult, SortDirection, DEFAULT_PAGE_SIZE};
pub use series::ReportSeries;
pub use stats::Statistics;

/// Stateless per call: every operation reads the generation captured at
/// construction, so a concurrent publish never shows up mid-query.
pub struct QueryEngine {
    generation: Arc<Generation>,
    categories: CategoryConfig,
    current_year: i32,
}

impl QueryEngine {
    pub fn new(generation: Arc<Generation>, categories: CategoryConfig) -> Self {
        Self {
            generation,
            categories,
            current_year: Utc::now().year(),
        }
    }

    /// Pin the year the recent-discovery window counts back from
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = year;
        self
    }

    pub fn generation(&self) -> &Generation {
        &self.generation
    }

    fn checked<T>(&self, operation: &str, result: Result<T, QueryError>) -> Result<T, QueryError> {
        if let Err(e) = &result {
            warn!(operation, error = %e, "Query rejected");
            metrics::query::rejected(operation);
        }
        result
    }

    /// Exact lookup by planet name
    pub fn get(&self, name: &str) -> Option<&NormalizedPlanet> {
        let started = Instant::now();
        let found = self.generation.get(name.trim());
        metrics::query::request("get", started.elapsed().as_secs_f64());
        found
    }

    /// Every planet matching `predicate`, sorted and paged
    #[instrument(skip(self), fields(generation = self.generation.sequence))]
    pub fn filter(&self, predicate: &Predicate, request: &PageRequest) -> QueryResult<'_> {
        let started = Instant::now();
        let matches: Vec<&NormalizedPlanet> = self
            .generation
            .planets
            .iter()
            .filter(|p| predicate.matches(p))
            .collect();
        debug!(matches = matches.len(), "Filter evaluated");
        let result = page::paginate(matches, request, predicate.to_string());
        metrics::query::request("filter", started.elapsed().as_secs_f64());
        result
    }

    pub fn list(&self, request: &PageRequest) -> QueryResult<'_> {
        self.filter(&Predicate::All, request)
    }

    /// Case-insensitive substring search on a text or enumerated field
    pub fn search(
        &self,
        field: PlanetField,
        term: &str,
        request: &PageRequest,
    ) -> Result<QueryResult<'_>, QueryError> {
        let predicate = self.checked("search", Predicate::contains(field, term))?;
        Ok(self.filter(&predicate, request))
    }

    /// Exact match on any field
    pub fn find_exact(
        &self,
        field: PlanetField,
        value: &str,
        request: &PageRequest,
    ) -> Result<QueryResult<'_>, QueryError> {
        let predicate = self.checked("exact", Predicate::equals(field, value))?;
        Ok(self.filter(&predicate, request))
    }

    /// Inclusive numeric range; planets with the field unknown never match.
    pub fn range(
        &self,
        field: PlanetField,
        lower: Option<f64>,
        upper: Option<f64>,
        request: &PageRequest,
    ) -> Result<QueryResult<'_>, QueryError> {
        let predicate = self.checked("range", Predicate::range(field, lower, upper))?;
        Ok(self.filter(&predicate, request))
    }

    pub fn category_predicate(&self, category: &Category) -> Result<Predicate, QueryError> {
        category.predicate(&self.categories, self.current_year)
    }

    pub fn category(
        &self,
        category: &Category,
        request: &PageRequest,
    ) -> Result<QueryResult<'_>, QueryError> {
        let predicate = self.checked("category", self.category_predicate(category))?;
        let mut result = self.filter(&predicate, request);
        result.filter = format!("{}: {}", category, result.filter);
        Ok(result)
    }

    /// One planet chosen uniformly among those matching `filter` (or all).
    pub fn random<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        filter: Option<&Predicate>,
    ) -> Option<&NormalizedPlanet> {
        let started = Instant::now();
        let pool: Vec<&NormalizedPlanet> = match filter {
            Some(predicate) => self
                .generation
                .planets
                .iter()
                .filter(|p| predicate.matches(p))
                .collect(),
            None => self.generation.planets.iter().collect(),
        };
        let chosen = pool.choose(rng).copied();
        metrics::query::request("random", started.elapsed().as_secs_f64());
        chosen
    }

    pub fn statistics(&self, filter: Option<&Predicate>) -> Statistics {
        let started = Instant::now();
        let stats = match filter {
            Some(predicate) => {
                Statistics::compute(self.generation.planets.iter().filter(|p| predicate.matches(p)))
            }
            None => Statistics::compute(&self.generation.planets),
        };
        metrics::query::request("statistics", started.elapsed().as_secs_f64());
        stats
    }

    pub fn series(&self, filter: Option<&Predicate>) -> ReportSeries {
        let started = Instant::now();
        let series = match filter {
            Some(predicate) => {
                ReportSeries::build(self.generation.planets.iter().filter(|p| predicate.matches(p)))
            }
            None => ReportSeries::build(&self.generation.planets),
        };
        metrics::query::request("series", started.elapsed().as_secs_f64());
        series
    }
}

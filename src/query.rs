use serde::Deserialize;

/// SQL query builder for the route listing endpoint
/// Builds a single parameterized query with filters, sorting, and pagination
pub struct SQLQueryBuilder {
    base_query: String,
    where_clauses: Vec<String>,
    params: Vec<String>,
    order_clause: Option<String>,
    limit: u32,
    offset: u32,
}

impl SQLQueryBuilder {
    /// Creates a new SQLQueryBuilder with default values
    pub fn new() -> Self {
        Self {
            base_query: "SELECT * FROM routes".to_string(),
            where_clauses: Vec::new(),
            params: Vec::new(),
            order_clause: None,
            limit: 10,
            offset: 0,
        }
    }

    /// Adds a search filter matching either endpoint of the route
    /// Uses ILIKE for PostgreSQL case-insensitive pattern matching
    pub fn add_search_filter(&mut self, search: &str) {
        let first = self.params.len() + 1;
        let second = first + 1;
        self.where_clauses
            .push(format!("(origin ILIKE ${} OR destination ILIKE ${})", first, second));
        self.params.push(format!("%{}%", search));
        self.params.push(format!("%{}%", search));
    }

    /// Adds a category filter for exact category matching (case-insensitive)
    pub fn add_category_filter(&mut self, category: &str) {
        let param_index = self.params.len() + 1;
        self.where_clauses.push(format!("category ILIKE ${}", param_index));
        self.params.push(category.to_string());
    }

    /// Restricts the listing to active routes
    /// No bind parameter needed, the predicate is constant
    pub fn add_active_filter(&mut self) {
        self.where_clauses.push("is_active = TRUE".to_string());
    }

    /// Sets the sort order for the query
    pub fn set_sort(&mut self, field: SortField, order: SortOrder) {
        let field_name = match field {
            SortField::Origin => "origin",
            SortField::CreatedAt => "created_at",
        };

        let order_str = match order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };

        self.order_clause = Some(format!("{} {}", field_name, order_str));
    }

    /// Sets pagination parameters
    /// Calculates LIMIT and OFFSET based on page number and limit
    pub fn set_pagination(&mut self, page: u32, limit: u32) {
        self.limit = limit;
        self.offset = (page - 1) * limit;
    }

    /// Builds the final SQL query string with all parameters
    /// Returns a tuple of (query_string, parameters)
    pub fn build(&self) -> (String, Vec<String>) {
        let mut query = self.base_query.clone();

        if !self.where_clauses.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&self.where_clauses.join(" AND "));
        }

        if let Some(ref order) = self.order_clause {
            query.push_str(" ORDER BY ");
            query.push_str(order);
        }

        // LIMIT and OFFSET go into the query string directly; PostgreSQL
        // requires integers here, not text parameters
        query.push_str(&format!(" LIMIT {}", self.limit));
        query.push_str(&format!(" OFFSET {}", self.offset));

        (query, self.params.clone())
    }
}

/// Query parameters extracted from the HTTP request
/// All fields are optional to support flexible querying
#[derive(Debug, Deserialize)]
pub struct QueryParams {
    /// Search term matched against origin and destination (case-insensitive)
    pub search: Option<String>,
    /// Filter by route category (case-insensitive exact match)
    pub category: Option<String>,
    /// When true, only active routes are returned
    pub active_only: Option<bool>,
    /// Sort field: "origin" or "created"
    pub sort: Option<String>,
    /// Sort order: "asc" or "desc"
    pub order: Option<String>,
    /// Page number (1-indexed, defaults to 1)
    pub page: Option<u32>,
    /// Items per page (defaults to 10)
    pub limit: Option<u32>,
}

/// Sort field options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Origin,
    CreatedAt,
}

/// Sort order options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Validated and normalized query parameters
#[derive(Debug)]
pub struct ValidatedQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub active_only: bool,
    pub sort_field: Option<SortField>,
    pub sort_order: SortOrder,
    pub page: u32,
    pub limit: u32,
}

/// Validation error type
#[derive(Debug)]
pub struct ValidationError {
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Query parameter validator
pub struct QueryValidator;

impl QueryValidator {
    /// Validates and normalizes query parameters
    /// Returns ValidatedQuery on success or ValidationError on failure
    pub fn validate(params: QueryParams) -> Result<ValidatedQuery, ValidationError> {
        let search = Self::normalize_string(params.search);
        let category = Self::normalize_string(params.category);

        let sort_field = if let Some(sort_str) = params.sort {
            Some(Self::parse_sort_field(&sort_str)?)
        } else {
            None
        };

        let sort_order = if let Some(order_str) = params.order {
            Self::parse_sort_order(&order_str)?
        } else {
            // Newest routes first when sorting by creation time
            match sort_field {
                Some(SortField::CreatedAt) => SortOrder::Desc,
                _ => SortOrder::Asc,
            }
        };

        let page = if let Some(p) = params.page {
            Self::validate_pagination_param(p, "page")?;
            p
        } else {
            1
        };

        let limit = if let Some(l) = params.limit {
            Self::validate_pagination_param(l, "limit")?;
            l
        } else {
            10
        };

        Ok(ValidatedQuery {
            search,
            category,
            active_only: params.active_only.unwrap_or(false),
            sort_field,
            sort_order,
            page,
            limit,
        })
    }

    /// Normalizes string parameters by trimming whitespace
    /// Returns None if the string is empty or whitespace-only
    fn normalize_string(s: Option<String>) -> Option<String> {
        s.and_then(|s| {
            let trimmed = s.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        })
    }

    /// Parses sort field string to SortField enum
    fn parse_sort_field(s: &str) -> Result<SortField, ValidationError> {
        match s.to_lowercase().as_str() {
            "origin" => Ok(SortField::Origin),
            "created" => Ok(SortField::CreatedAt),
            _ => Err(ValidationError {
                message: format!("Invalid sort field '{}'. Must be 'origin' or 'created'", s),
            }),
        }
    }

    /// Parses sort order string to SortOrder enum
    fn parse_sort_order(s: &str) -> Result<SortOrder, ValidationError> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(ValidationError {
                message: format!("Invalid sort order '{}'. Must be 'asc' or 'desc'", s),
            }),
        }
    }

    /// Validates pagination parameters (page and limit)
    fn validate_pagination_param(value: u32, param_name: &str) -> Result<(), ValidationError> {
        if value == 0 {
            return Err(ValidationError {
                message: format!("{} must be a positive number (greater than 0)", param_name),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_builder_basic_query() {
        let builder = SQLQueryBuilder::new();
        let (query, params) = builder.build();

        assert!(query.contains("SELECT * FROM routes"));
        assert!(query.contains("LIMIT"));
        assert!(query.contains("OFFSET"));
        assert_eq!(params.len(), 0);
    }

    #[test]
    fn test_sql_builder_with_search() {
        let mut builder = SQLQueryBuilder::new();
        builder.add_search_filter("makkah");
        let (query, params) = builder.build();

        assert!(query.contains("WHERE"));
        assert!(query.contains("origin ILIKE $1 OR destination ILIKE $2"));
        assert_eq!(params[0], "%makkah%");
        assert_eq!(params[1], "%makkah%");
    }

    #[test]
    fn test_sql_builder_with_category_filter() {
        let mut builder = SQLQueryBuilder::new();
        builder.add_category_filter("ziarat");
        let (query, params) = builder.build();

        assert!(query.contains("category ILIKE $1"));
        assert_eq!(params[0], "ziarat");
    }

    #[test]
    fn test_sql_builder_with_active_filter() {
        let mut builder = SQLQueryBuilder::new();
        builder.add_active_filter();
        let (query, params) = builder.build();

        assert!(query.contains("is_active = TRUE"));
        assert_eq!(params.len(), 0);
    }

    #[test]
    fn test_sql_builder_with_sorting() {
        let mut builder = SQLQueryBuilder::new();
        builder.set_sort(SortField::CreatedAt, SortOrder::Desc);
        let (query, _) = builder.build();

        assert!(query.contains("ORDER BY created_at DESC"));
    }

    #[test]
    fn test_sql_builder_with_pagination() {
        let mut builder = SQLQueryBuilder::new();
        builder.set_pagination(3, 20);
        let (query, _params) = builder.build();

        assert!(query.contains("LIMIT 20"));
        assert!(query.contains("OFFSET 40"));
    }

    #[test]
    fn test_sql_builder_combined_filters() {
        let mut builder = SQLQueryBuilder::new();
        builder.add_search_filter("airport");
        builder.add_category_filter("airport_arrival");
        builder.add_active_filter();
        builder.set_sort(SortField::Origin, SortOrder::Asc);
        builder.set_pagination(1, 10);

        let (query, params) = builder.build();

        assert!(query.contains("WHERE"));
        assert!(query.contains("origin ILIKE $1 OR destination ILIKE $2"));
        assert!(query.contains("AND"));
        assert!(query.contains("category ILIKE $3"));
        assert!(query.contains("is_active = TRUE"));
        assert!(query.contains("ORDER BY origin ASC"));

        assert_eq!(params[0], "%airport%");
        assert_eq!(params[1], "%airport%");
        assert_eq!(params[2], "airport_arrival");
    }

    #[test]
    fn test_normalize_string_with_whitespace() {
        assert_eq!(
            QueryValidator::normalize_string(Some("  Makkah  ".to_string())),
            Some("Makkah".to_string())
        );
    }

    #[test]
    fn test_normalize_string_empty() {
        assert_eq!(QueryValidator::normalize_string(Some("   ".to_string())), None);
        assert_eq!(QueryValidator::normalize_string(None), None);
    }

    #[test]
    fn test_parse_sort_field() {
        assert_eq!(QueryValidator::parse_sort_field("origin").unwrap(), SortField::Origin);
        assert_eq!(QueryValidator::parse_sort_field("CREATED").unwrap(), SortField::CreatedAt);
        assert!(QueryValidator::parse_sort_field("price").is_err());
    }

    #[test]
    fn test_parse_sort_order() {
        assert_eq!(QueryValidator::parse_sort_order("asc").unwrap(), SortOrder::Asc);
        assert_eq!(QueryValidator::parse_sort_order("DESC").unwrap(), SortOrder::Desc);
        assert!(QueryValidator::parse_sort_order("random").is_err());
    }

    #[test]
    fn test_validate_pagination_param_zero() {
        assert!(QueryValidator::validate_pagination_param(0, "page").is_err());
        assert!(QueryValidator::validate_pagination_param(1, "page").is_ok());
    }

    #[test]
    fn test_validate_full_query_with_defaults() {
        let params = QueryParams {
            search: None,
            category: None,
            active_only: None,
            sort: None,
            order: None,
            page: None,
            limit: None,
        };

        let validated = QueryValidator::validate(params).unwrap();
        assert_eq!(validated.page, 1);
        assert_eq!(validated.limit, 10);
        assert!(!validated.active_only);
        assert_eq!(validated.sort_order, SortOrder::Asc);
    }

    #[test]
    fn test_validate_sort_defaults() {
        // Creation-time sort defaults to newest first
        let params = QueryParams {
            search: None,
            category: None,
            active_only: None,
            sort: Some("created".to_string()),
            order: None,
            page: None,
            limit: None,
        };

        let validated = QueryValidator::validate(params).unwrap();
        assert_eq!(validated.sort_field, Some(SortField::CreatedAt));
        assert_eq!(validated.sort_order, SortOrder::Desc);

        // Origin sort defaults to ascending
        let params = QueryParams {
            search: None,
            category: None,
            active_only: None,
            sort: Some("origin".to_string()),
            order: None,
            page: None,
            limit: None,
        };

        let validated = QueryValidator::validate(params).unwrap();
        assert_eq!(validated.sort_field, Some(SortField::Origin));
        assert_eq!(validated.sort_order, SortOrder::Asc);
    }
}

//! Tree configuration.

use crate::errors::{RTreeError, RTreeResult};
use crate::selector::Selector;
use crate::splitter::{ListPairMetric, Splitter};

/// Default maximum number of children per node.
pub const DEFAULT_MAX_CHILDREN: usize = 4;

/// Fraction of `max_children` used as `min_children` when none is given.
pub const DEFAULT_FILLING_FACTOR: f64 = 0.4;

/// Immutable configuration shared by every version of a tree.
///
/// A context is created once, validated, and then shared by `Arc` across all
/// tree versions derived from the same empty tree.
///
/// # Examples
///
/// ```rust
/// use immutable_rtree::{Context, Selector, Splitter};
///
/// let context = Context::builder()
///     .max_children(8)
///     .min_children(3)
///     .selector(Selector::MinimalAreaIncrease)
///     .splitter(Splitter::Quadratic)
///     .build()
///     .unwrap();
/// assert_eq!(context.max_children(), 8);
///
/// // invalid configurations are rejected before any tree exists
/// assert!(Context::builder().max_children(2).build().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    min_children: usize,
    max_children: usize,
    selector: Selector,
    splitter: Splitter,
}

impl Context {
    /// Validates and creates a context.
    pub fn new(
        min_children: usize,
        max_children: usize,
        selector: Selector,
        splitter: Splitter,
    ) -> RTreeResult<Self> {
        if max_children <= 2 {
            return Err(RTreeError::InvalidConfiguration(format!(
                "max_children must be greater than 2, got {}",
                max_children
            )));
        }
        if min_children < 1 {
            return Err(RTreeError::InvalidConfiguration(
                "min_children must be at least 1".to_string(),
            ));
        }
        if min_children.saturating_mul(2) > max_children.saturating_add(1) {
            return Err(RTreeError::InvalidConfiguration(format!(
                "min_children {} is too large for max_children {}: an overflowing node of {} could not be split",
                min_children,
                max_children,
                max_children.saturating_add(1)
            )));
        }
        Ok(Self {
            min_children,
            max_children,
            selector,
            splitter,
        })
    }

    /// Starts a fluent context builder.
    pub fn builder() -> ContextBuilder {
        ContextBuilder::new()
    }

    /// Quadratic splitter with minimal-area-increase selection.
    pub fn default_context() -> Self {
        Self {
            min_children: default_min_children(DEFAULT_MAX_CHILDREN),
            max_children: DEFAULT_MAX_CHILDREN,
            selector: Selector::MinimalAreaIncrease,
            splitter: Splitter::Quadratic,
        }
    }

    /// R*-tree mode: topological splitter with minimal-overlap selection.
    pub fn star() -> Self {
        Self {
            min_children: default_min_children(DEFAULT_MAX_CHILDREN),
            max_children: DEFAULT_MAX_CHILDREN,
            selector: Selector::MinimalOverlap,
            splitter: Splitter::Topological(ListPairMetric::Overlap),
        }
    }

    pub fn min_children(&self) -> usize {
        self.min_children
    }

    pub fn max_children(&self) -> usize {
        self.max_children
    }

    pub fn selector(&self) -> Selector {
        self.selector
    }

    pub fn splitter(&self) -> Splitter {
        self.splitter
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::default_context()
    }
}

fn default_min_children(max_children: usize) -> usize {
    ((max_children as f64 * DEFAULT_FILLING_FACTOR).round() as usize).max(1)
}

/// Fluent builder for [`Context`].
///
/// Setters record the first configuration error and ignore later calls;
/// the error is returned from [`ContextBuilder::build`].
#[derive(Debug)]
pub struct ContextBuilder {
    error: Option<RTreeError>,
    min_children: Option<usize>,
    max_children: usize,
    selector: Selector,
    splitter: Splitter,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextBuilder {
    pub fn new() -> Self {
        ContextBuilder {
            error: None,
            min_children: None,
            max_children: DEFAULT_MAX_CHILDREN,
            selector: Selector::default(),
            splitter: Splitter::default(),
        }
    }

    /// Sets the minimum number of children of a non-root node.
    ///
    /// When not set, it is derived from `max_children` with
    /// [`DEFAULT_FILLING_FACTOR`].
    pub fn min_children(mut self, min_children: usize) -> Self {
        if self.error.is_none() {
            if min_children < 1 {
                self.error = Some(RTreeError::InvalidConfiguration(
                    "min_children must be at least 1".to_string(),
                ));
            } else {
                self.min_children = Some(min_children);
            }
        }
        self
    }

    /// Sets the maximum number of children of any node.
    pub fn max_children(mut self, max_children: usize) -> Self {
        if self.error.is_none() {
            if max_children <= 2 {
                self.error = Some(RTreeError::InvalidConfiguration(format!(
                    "max_children must be greater than 2, got {}",
                    max_children
                )));
            } else {
                self.max_children = max_children;
            }
        }
        self
    }

    pub fn selector(mut self, selector: Selector) -> Self {
        self.selector = selector;
        self
    }

    pub fn splitter(mut self, splitter: Splitter) -> Self {
        self.splitter = splitter;
        self
    }

    /// Switches to R*-tree mode (topological split, minimal overlap).
    pub fn star(self) -> Self {
        self.selector(Selector::MinimalOverlap)
            .splitter(Splitter::Topological(ListPairMetric::Overlap))
    }

    pub fn build(self) -> RTreeResult<Context> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let min_children = self
            .min_children
            .unwrap_or_else(|| default_min_children(self.max_children));
        Context::new(min_children, self.max_children, self.selector, self.splitter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_context() {
        let context = Context::default();
        assert_eq!(context.max_children(), 4);
        assert_eq!(context.min_children(), 2);
        assert_eq!(context.selector(), Selector::MinimalAreaIncrease);
        assert_eq!(context.splitter(), Splitter::Quadratic);
    }

    #[test]
    fn test_star_context() {
        let context = Context::star();
        assert_eq!(context.selector(), Selector::MinimalOverlap);
        assert_eq!(
            context.splitter(),
            Splitter::Topological(ListPairMetric::Overlap)
        );
        assert_eq!(Context::builder().star().build().unwrap(), context);
    }

    #[test]
    fn test_min_children_derived_from_max() {
        let context = Context::builder().max_children(10).build().unwrap();
        assert_eq!(context.min_children(), 4);
        let context = Context::builder().max_children(3).build().unwrap();
        assert_eq!(context.min_children(), 1);
    }

    #[test]
    fn test_rejects_small_max_children() {
        let err = Context::builder().max_children(2).build().unwrap_err();
        assert!(matches!(err, RTreeError::InvalidConfiguration(_)));
        assert!(Context::new(1, 2, Selector::default(), Splitter::default()).is_err());
    }

    #[test]
    fn test_rejects_zero_min_children() {
        assert!(Context::builder().min_children(0).build().is_err());
        assert!(Context::new(0, 4, Selector::default(), Splitter::default()).is_err());
    }

    #[test]
    fn test_rejects_unsplittable_min_children() {
        assert!(Context::builder().max_children(4).min_children(3).build().is_err());
        assert!(Context::builder().max_children(5).min_children(3).build().is_ok());
    }

    #[test]
    fn test_rejects_huge_min_children_without_overflow() {
        let err = Context::new(
            usize::MAX / 2 + 1,
            usize::MAX,
            Selector::default(),
            Splitter::default(),
        )
        .unwrap_err();
        assert!(matches!(err, RTreeError::InvalidConfiguration(_)));

        let built = Context::builder().min_children(usize::MAX).build();
        assert!(matches!(built, Err(RTreeError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_first_error_wins() {
        let err = Context::builder()
            .max_children(1)
            .min_children(0)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("max_children"));
    }
}

//! Capability traits shared by every kind of query builder.
//!
//! The traits are split by what they need to know: [`Named`] needs nothing,
//! [`Conditional`] needs the context, and [`Evaluatable`] additionally needs
//! the scope type. Set operations only require the capability they use, so
//! `set.lookup("status")` works without naming the context or scope types.

/// A query builder identified by name.
pub trait Named {
    /// Stable identifier used for lookup and labelling.
    fn name(&self) -> &str;

    /// Whether the transform ran during the last evaluation pass.
    fn is_applied(&self) -> bool;
}

/// A query builder whose visibility and application depend on a context.
pub trait Conditional<C>: Named {
    /// Whether the builder should be shown, regardless of query effect.
    fn render_check(&self, ctx: &C) -> bool;

    /// Whether calling the builder would run its transform.
    fn should_apply(&self, ctx: &C) -> bool {
        self.render_check(ctx)
    }
}

/// A query builder that transforms a scope of type `S`.
pub trait Evaluatable<C, S>: Conditional<C> {
    /// Runs the transform if [`should_apply`](Conditional::should_apply) holds,
    /// otherwise hands back `scope` unchanged.
    fn call(&mut self, ctx: &C, scope: S) -> S;
}

impl<B: Named + ?Sized> Named for Box<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn is_applied(&self) -> bool {
        (**self).is_applied()
    }
}

impl<C, B: Conditional<C> + ?Sized> Conditional<C> for Box<B> {
    fn render_check(&self, ctx: &C) -> bool {
        (**self).render_check(ctx)
    }

    fn should_apply(&self, ctx: &C) -> bool {
        (**self).should_apply(ctx)
    }
}

impl<C, S, B: Evaluatable<C, S> + ?Sized> Evaluatable<C, S> for Box<B> {
    fn call(&mut self, ctx: &C, scope: S) -> S {
        (**self).call(ctx, scope)
    }
}

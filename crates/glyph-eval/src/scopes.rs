//! Scope tracking and cycle collection.
//!
//! A closure stored in the scope it captured (through `let`, or `define`
//! inside a lambda body) forms an `Rc` cycle that reference counting alone
//! never frees. The evaluator creates every child scope through a
//! [`ScopeRegistry`], which can later find and clear the scopes that are
//! reachable only from such cycles.

use std::collections::{HashMap, HashSet};
use std::rc::{Rc, Weak};

use crate::env::{Env, Environment};
use crate::value::Lambda;

/// Registry size that triggers the first collection.
const MIN_COLLECT_AT: usize = 64;

#[derive(Debug, Clone, Copy)]
enum Node {
    Scope(usize),
    Lambda(*const Lambda),
}

struct LambdaNode {
    /// Strong references not accounted for by registered scopes.
    external: usize,
    /// Index of the captured scope, when it is registered.
    env: Option<usize>,
}

/// Weak handles to every scope an evaluator created.
pub(crate) struct ScopeRegistry {
    scopes: Vec<Weak<Environment>>,
    collect_at: usize,
}

impl ScopeRegistry {
    pub(crate) fn new() -> Self {
        Self {
            scopes: Vec::new(),
            collect_at: MIN_COLLECT_AT,
        }
    }

    /// A new registered scope whose parent is `parent`.
    pub(crate) fn child(&mut self, parent: &Env) -> Env {
        let scope = Environment::child(parent);
        self.scopes.push(Rc::downgrade(&scope));
        scope
    }

    /// Registered scopes still alive.
    pub(crate) fn live(&self) -> usize {
        self.scopes.iter().filter(|w| w.strong_count() > 0).count()
    }

    pub(crate) fn should_collect(&self) -> bool {
        self.scopes.len() >= self.collect_at
    }

    /// Clear every registered scope that nothing outside the registered
    /// scopes and their closures can reach. Returns how many were cleared.
    ///
    /// Works from strong counts: a scope or closure whose count exceeds the
    /// references held by registered scopes is referenced from elsewhere
    /// (the host, the global scope, a stack frame) and is kept along with
    /// everything it reaches.
    pub(crate) fn collect(&mut self) -> usize {
        self.scopes.retain(|w| w.strong_count() > 0);
        let live: Vec<Env> = self.scopes.iter().filter_map(Weak::upgrade).collect();
        let index: HashMap<*const Environment, usize> = live
            .iter()
            .enumerate()
            .map(|(i, scope)| (Rc::as_ptr(scope), i))
            .collect();

        // `live` itself holds one reference to each scope.
        let mut external: Vec<usize> = live.iter().map(|s| Rc::strong_count(s) - 1).collect();
        let mut lambdas: HashMap<*const Lambda, LambdaNode> = HashMap::new();
        let mut edges: Vec<Vec<Node>> = vec![Vec::new(); live.len()];

        for (i, scope) in live.iter().enumerate() {
            if let Some(&parent) = scope.parent().and_then(|p| index.get(&Rc::as_ptr(p))) {
                external[parent] = external[parent].saturating_sub(1);
                edges[i].push(Node::Scope(parent));
            }
            scope.for_each_lambda(|lambda| {
                let ptr = Rc::as_ptr(lambda);
                let node = lambdas.entry(ptr).or_insert_with(|| LambdaNode {
                    external: Rc::strong_count(lambda),
                    env: index.get(&Rc::as_ptr(&lambda.env)).copied(),
                });
                node.external = node.external.saturating_sub(1);
                edges[i].push(Node::Lambda(ptr));
            });
        }
        for node in lambdas.values() {
            if let Some(env) = node.env {
                external[env] = external[env].saturating_sub(1);
            }
        }

        let mut stack: Vec<Node> = external
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(i, _)| Node::Scope(i))
            .collect();
        stack.extend(
            lambdas
                .iter()
                .filter(|(_, node)| node.external > 0)
                .map(|(ptr, _)| Node::Lambda(*ptr)),
        );
        let mut reached = vec![false; live.len()];
        let mut reached_lambdas: HashSet<*const Lambda> = HashSet::new();
        while let Some(node) = stack.pop() {
            match node {
                Node::Scope(i) => {
                    if !reached[i] {
                        reached[i] = true;
                        stack.extend(edges[i].iter().copied());
                    }
                }
                Node::Lambda(ptr) => {
                    if reached_lambdas.insert(ptr) {
                        if let Some(env) = lambdas.get(&ptr).and_then(|n| n.env) {
                            stack.push(Node::Scope(env));
                        }
                    }
                }
            }
        }

        let mut cleared = 0;
        for (scope, reached) in live.iter().zip(&reached) {
            if !reached {
                scope.clear();
                cleared += 1;
            }
        }
        drop(live);

        self.scopes.retain(|w| w.strong_count() > 0);
        self.collect_at = (self.scopes.len() * 2).max(MIN_COLLECT_AT);
        cleared
    }

    /// Clear every registered scope that is still alive.
    pub(crate) fn clear_all(&mut self) {
        for scope in self.scopes.drain(..) {
            if let Some(scope) = scope.upgrade() {
                scope.clear();
            }
        }
    }
}

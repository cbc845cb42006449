//! Class metadata: methods, parent list, constants, static variables, and
//! the functional-domain restriction mask a sandboxed program can forbid
//! (grounded on the original's per-builtin `QDOM_*` domain bitmask).

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use strand_lvalue::Cell;
use strand_value::{Callable, Value};

/// Bitmask of functional domains a class or one of its methods touches.
/// A restricted `Program` rejects committing any declaration whose mask
/// intersects its forbidden set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DomainMask(pub u32);

impl DomainMask {
    pub const DEFAULT: DomainMask = DomainMask(0);
    pub const THREAD_CONTROL: DomainMask = DomainMask(1 << 0);
    pub const THREAD_INFO: DomainMask = DomainMask(1 << 1);
    pub const FILESYSTEM: DomainMask = DomainMask(1 << 2);
    pub const NETWORK: DomainMask = DomainMask(1 << 3);
    pub const EXTERNAL_PROCESS: DomainMask = DomainMask(1 << 4);
    pub const LOCALE_CONTROL: DomainMask = DomainMask(1 << 5);

    pub fn union(self, other: DomainMask) -> DomainMask {
        DomainMask(self.0 | other.0)
    }

    pub fn intersects(self, other: DomainMask) -> bool {
        self.0 & other.0 != 0
    }
}

pub struct Class {
    pub name: String,
    /// Direct parent classes in declaration order; `Base::x` scoped lookup
    /// walks this list, while `self.x` prefers the member defined directly
    /// on this class over any inherited one with the same name (§4.4 tie-break).
    pub parents: Vec<Arc<Class>>,
    pub methods: HashMap<String, Arc<dyn Callable>>,
    pub constants: HashMap<String, Value>,
    pub static_vars: HashMap<String, Cell>,
    pub domain: DomainMask,
}

// `Callable` doesn't implement `Debug` for its trait object (only as a
// supertrait bound on concrete implementors), so this only names the
// method set rather than deriving through it — the same reason `Value`
// hand-writes its own `Debug` instead of deriving one.
impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("parents", &self.parents.iter().map(|p| &p.name).collect::<Vec<_>>())
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .field("constants", &self.constants)
            .field("domain", &self.domain)
            .finish()
    }
}

impl Class {
    pub fn new(name: impl Into<String>) -> Self {
        Class {
            name: name.into(),
            parents: Vec::new(),
            methods: HashMap::new(),
            constants: HashMap::new(),
            static_vars: HashMap::new(),
            domain: DomainMask::DEFAULT,
        }
    }

    /// `self.x` resolution: this class's own method wins over anything
    /// inherited, and inherited lookups walk the C3 linearization of the
    /// parent list rather than a plain left-to-right DFS, so a diamond
    /// (`D: B, C` with `B, C: A`) resolves through whichever of `B`/`C`
    /// overrides `A` consistently, instead of falling through to `A` via
    /// whichever parent happens to be listed first.
    pub fn find_member(&self, name: &str) -> Option<Arc<dyn Callable>> {
        if let Some(m) = self.methods.get(name) {
            return Some(m.clone());
        }
        self.parent_mro().iter().find_map(|p| p.methods.get(name).cloned())
    }

    /// `Base::x` scoped resolution: looks only at `base`'s own declarations,
    /// not at this class's override (§4.4 tie-break, second half). Already
    /// disambiguated by name, so it has no MRO-consistency concern the way
    /// unqualified `self.x` lookup does.
    pub fn find_scoped(&self, base: &str, name: &str) -> Option<Arc<dyn Callable>> {
        if self.name == base {
            return self.methods.get(name).cloned();
        }
        self.parents.iter().find_map(|p| p.find_scoped(base, name))
    }

    /// C3 linearization of this class's parents (not including `self`),
    /// merging each parent's own linearization with the declared parent
    /// order.
    fn parent_mro(&self) -> Vec<Arc<Class>> {
        if self.parents.is_empty() {
            return Vec::new();
        }
        let mut to_merge: Vec<Vec<Arc<Class>>> = self.parents.iter().map(class_linearization).collect();
        to_merge.push(self.parents.clone());
        c3_merge(to_merge)
    }

    pub fn find_constant(&self, name: &str) -> Option<Value> {
        self.constants.get(name).cloned().or_else(|| self.parents.iter().find_map(|p| p.find_constant(name)))
    }

    /// Combined domain mask across this class and everything it inherits
    /// from, used for the sandboxed-program restriction check.
    pub fn effective_domain(&self) -> DomainMask {
        self.parents.iter().fold(self.domain, |acc, p| acc.union(p.effective_domain()))
    }
}

/// `class`'s full C3 linearization, `class` itself first.
fn class_linearization(class: &Arc<Class>) -> Vec<Arc<Class>> {
    let mut result = vec![class.clone()];
    if !class.parents.is_empty() {
        let mut to_merge: Vec<Vec<Arc<Class>>> = class.parents.iter().map(class_linearization).collect();
        to_merge.push(class.parents.clone());
        result.extend(c3_merge(to_merge));
    }
    result
}

/// The C3 merge step: repeatedly takes the first list head that doesn't
/// also appear in the tail of any other list, appending it to the result
/// and removing it everywhere. Falls back to the first remaining head on
/// an inconsistent hierarchy (conflicting declared parent orders) rather
/// than failing resolution outright.
fn c3_merge(mut lists: Vec<Vec<Arc<Class>>>) -> Vec<Arc<Class>> {
    let mut result = Vec::new();
    loop {
        lists.retain(|l| !l.is_empty());
        if lists.is_empty() {
            return result;
        }
        let head = lists
            .iter()
            .find_map(|l| {
                let candidate = &l[0];
                let in_some_tail = lists.iter().any(|other| other[1..].iter().any(|c| Arc::ptr_eq(c, candidate)));
                if in_some_tail { None } else { Some(candidate.clone()) }
            })
            .unwrap_or_else(|| lists[0][0].clone());
        for l in lists.iter_mut() {
            l.retain(|c| !Arc::ptr_eq(c, &head));
        }
        result.push(head);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_access_prefers_own_member_over_inherited() {
        let mut base = Class::new("Base");
        base.constants.insert("x".to_string(), Value::Int(1));
        let base = Arc::new(base);

        let mut derived = Class::new("Derived");
        derived.constants.insert("x".to_string(), Value::Int(2));
        derived.parents.push(base.clone());

        assert_eq!(derived.find_constant("x"), Some(Value::Int(2)));
        assert_eq!(base.find_constant("x"), Some(Value::Int(1)));
    }

    #[derive(Debug)]
    struct DummyCallable {
        program: Arc<dyn strand_value::ProgramContext>,
    }
    impl Callable for DummyCallable {
        fn invoke(&self, _args: Vec<Value>) -> Result<Value, strand_value::ExceptionCore> {
            Ok(Value::Nothing)
        }
        fn program_context(&self) -> Arc<dyn strand_value::ProgramContext> {
            self.program.clone()
        }
        fn name(&self) -> &str {
            "greet"
        }
    }

    #[derive(Debug)]
    struct TestProgram;
    impl strand_value::ProgramContext for TestProgram {
        fn program_id(&self) -> u64 {
            1
        }
    }

    fn method() -> Arc<dyn Callable> {
        Arc::new(DummyCallable { program: Arc::new(TestProgram) })
    }

    /// `D: B, C` where both `B` and `C` override `A::greet`; `D` doesn't
    /// override it itself. C3 says `D`'s MRO is `D, B, C, A`, so `B`'s
    /// override must win — a plain DFS over `parents` (which recurses
    /// fully into `B`, reaching `A` through `B` before ever trying `C`)
    /// would also find `B`'s override here, but only by accident; flip
    /// which of `B`/`C` actually overrides the method and DFS gets it
    /// wrong while C3 stays consistent, which is what the second half of
    /// this test checks.
    #[test]
    fn diamond_inheritance_resolves_via_c3_not_first_parent_dfs() {
        let mut a = Class::new("A");
        a.methods.insert("greet".to_string(), method());
        let a = Arc::new(a);

        let mut b = Class::new("B");
        b.methods.insert("greet".to_string(), method());
        b.parents.push(a.clone());
        let b = Arc::new(b);

        // C declares no override of its own.
        let mut c = Class::new("C");
        c.parents.push(a.clone());
        let c = Arc::new(c);

        let mut d = Class::new("D");
        d.parents.push(b.clone());
        d.parents.push(c.clone());
        let d = Arc::new(d);

        // B is listed first and overrides greet, so both DFS and C3 agree
        // here; the real test is the second arrangement below.
        assert!(Arc::ptr_eq(&d.find_member("greet").unwrap(), &b.methods["greet"]));

        // Now only C overrides greet, with B left to inherit A's version.
        // A DFS over `parents` would recurse fully into B first, find no
        // override there, fall through to A, and return A's method without
        // ever looking at C. C3 instead linearizes D's MRO as D, B, C, A
        // and must still prefer C's override over A's, since C comes
        // before A in the merged order.
        let mut a2 = Class::new("A");
        a2.methods.insert("greet".to_string(), method());
        let a2 = Arc::new(a2);

        let b2 = Arc::new(Class { parents: vec![a2.clone()], ..Class::new("B") });

        let mut c2 = Class::new("C");
        c2.methods.insert("greet".to_string(), method());
        c2.parents.push(a2.clone());
        let c2 = Arc::new(c2);

        let d2 = Arc::new(Class { parents: vec![b2.clone(), c2.clone()], ..Class::new("D") });

        assert!(Arc::ptr_eq(&d2.find_member("greet").unwrap(), &c2.methods["greet"]));
    }

    #[test]
    fn effective_domain_unions_parents() {
        let mut base = Class::new("Base");
        base.domain = DomainMask::FILESYSTEM;
        let base = Arc::new(base);

        let mut derived = Class::new("Derived");
        derived.domain = DomainMask::NETWORK;
        derived.parents.push(base);

        let eff = derived.effective_domain();
        assert!(eff.intersects(DomainMask::FILESYSTEM));
        assert!(eff.intersects(DomainMask::NETWORK));
        assert!(!eff.intersects(DomainMask::THREAD_CONTROL));
    }
}

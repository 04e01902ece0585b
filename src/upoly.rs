//! `UPoly`: unconstrained-dimension projection.
//!
//! Many analyses carry dimensions that end up never actually constrained
//! (a scratch temporary, a dead variable). `UPoly` elides them from the
//! DD engine entirely: `info[i]` is the kernel dimension dimension `i` has
//! been allocated, or `None` if `i` has never been constrained and so
//! doesn't exist in the `kernel` polyhedron at all. Every mutation that
//! could make a previously-live kernel dimension unconstrained again
//! (`add_con`, `add_gen`, `affine_image_assign`, and the synchronized
//! binary operations) re-checks via [`Poly::unconstrained_dims`] and elides
//! it back out, so `info` never carries a dead mapping for more than one
//! operation.

use crate::linexpr::LinExpr;
use crate::num::Z;
use crate::poly::Poly;
use crate::row::{Con, Gen, GenType, Topology};

// ======================================================================
// UPoly - PUBLIC

/// A polyhedron over `d` dimensions, represented by a smaller `kernel`
/// polyhedron over only the dimensions some row has actually mentioned.
#[derive(Clone, Debug)]
pub struct UPoly {
    d: usize,
    info: Vec<Option<usize>>,
    kernel: Poly,
}

impl UPoly {
    pub fn new_universe_with(d: usize, topology: Topology) -> Self {
        UPoly { d, info: vec![None; d], kernel: Poly::new_universe_with(0, topology) }
    }

    pub fn new_empty_with(d: usize, topology: Topology) -> Self {
        UPoly { d, info: vec![None; d], kernel: Poly::new_empty_with(0, topology) }
    }

    /// Builds a `UPoly` from a plain polyhedron, eliding every dimension
    /// `p` is unconstrained on.
    pub fn from_poly(mut p: Poly) -> UPoly {
        let d = p.space_dim();
        let topology = p.topology();
        if p.is_empty() {
            return UPoly::new_empty_with(d, topology);
        }
        let unconstrained = p.unconstrained_dims();
        let mapped: Vec<usize> = (0..d).filter(|&i| !unconstrained.contains(i)).collect();
        let mut pfunc: Vec<Option<usize>> = vec![None; d];
        let mut info = vec![None; d];
        for (local, &g) in mapped.iter().enumerate() {
            pfunc[g] = Some(local);
            info[g] = Some(local);
        }
        p.map_space_dims_assign(&pfunc);
        UPoly { d, info, kernel: p }
    }

    /// Flattens into a plain polyhedron of the full ambient dimension,
    /// reintroducing elided dimensions as unconstrained.
    pub fn to_poly(&mut self) -> Poly {
        let k = self.kernel.space_dim();
        let mapped_count = self.info.iter().filter(|o| o.is_some()).count();
        let extra = self.d - mapped_count;
        let mut p = self.kernel.clone();
        if extra > 0 {
            p.add_space_dims_assign(extra, false);
        }
        let mut pfunc: Vec<Option<usize>> = vec![None; k + extra];
        let mut next_new = k;
        for i in 0..self.d {
            match self.info[i] {
                Some(j) => pfunc[j] = Some(i),
                None => {
                    pfunc[next_new] = Some(i);
                    next_new += 1;
                }
            }
        }
        p.map_space_dims_assign(&pfunc);
        p
    }

    pub fn space_dim(&self) -> usize {
        self.d
    }

    pub fn topology(&self) -> Topology {
        self.kernel.topology()
    }

    pub fn is_empty(&mut self) -> bool {
        self.kernel.is_empty()
    }

    pub fn is_universe(&mut self) -> bool {
        self.kernel.is_universe()
    }

    fn allocate_kernel_dim(&mut self, i: usize) {
        self.kernel.add_space_dims_assign(1, false);
        self.info[i] = Some(self.kernel.space_dim() - 1);
    }

    fn localize_expr(&self, e: &LinExpr) -> LinExpr {
        let k = self.kernel.space_dim();
        let mut expr = LinExpr::zero_dim(k);
        for i in 0..self.d {
            if let Some(j) = self.info[i] {
                expr.set(j, e.get(i));
            }
        }
        expr
    }

    fn localize_con(&self, c: &Con) -> Con {
        Con::new(self.localize_expr(c.linear_expr()), c.inhomo_term().clone(), c.con_type())
    }

    fn localize_gen(&self, g: &Gen) -> Gen {
        Gen::new(g.gen_type(), self.localize_expr(g.linear_expr()), g.divisor().clone())
    }

    /// Drops every kernel dimension that has become unconstrained
    /// (`l(x_j)` among the kernel's generators), unmapping it back to
    /// `not_a_dim`.
    fn elide_unconstrained(&mut self) {
        loop {
            let unconstrained = self.kernel.unconstrained_dims();
            let Some(j) = unconstrained.iter().next() else { break };
            self.kernel.remove_space_dims_assign(&[j]);
            for slot in self.info.iter_mut() {
                match *slot {
                    Some(m) if m == j => *slot = None,
                    Some(m) if m > j => *slot = Some(m - 1),
                    _ => {}
                }
            }
        }
    }

    pub fn add_con(&mut self, c: Con) {
        for i in c.linear_expr().support().iter() {
            if self.info[i].is_none() {
                self.allocate_kernel_dim(i);
            }
        }
        let local = self.localize_con(&c);
        self.kernel.add_con(local);
        self.elide_unconstrained();
    }

    pub fn add_cons<I: IntoIterator<Item = Con>>(&mut self, cs: I) {
        for c in cs {
            self.add_con(c);
        }
    }

    /// A line with support entirely among already-elided dims is a no-op;
    /// otherwise the generator is rewritten into the
    /// kernel, allocating kernel dims for a point/closure-point's full
    /// support (a concrete point pins every coordinate it mentions) but
    /// not for a line/ray's (an unmapped direction component carries no
    /// information the kernel needs to keep).
    pub fn add_gen(&mut self, g: Gen) {
        match g.gen_type() {
            GenType::Line | GenType::Ray => {
                let any_mapped = g.linear_expr().support().iter().any(|i| self.info[i].is_some());
                if !any_mapped {
                    return;
                }
                let local = self.localize_gen(&g);
                self.kernel.add_gen(local);
            }
            GenType::Point | GenType::ClosurePoint => {
                for i in g.linear_expr().support().iter() {
                    if self.info[i].is_none() {
                        self.allocate_kernel_dim(i);
                    }
                }
                let local = self.localize_gen(&g);
                self.kernel.add_gen(local);
            }
        }
        self.elide_unconstrained();
    }

    pub fn add_gens<I: IntoIterator<Item = Gen>>(&mut self, gs: I) {
        for g in gs {
            self.add_gen(g);
        }
    }

    pub fn get_bounds(&mut self, var: usize) -> crate::bbox::Itv {
        match self.info[var] {
            Some(j) => self.kernel.get_bounds(j),
            None => crate::bbox::Itv::universe(),
        }
    }

    pub fn unconstrain_assign(&mut self, vars: &[usize]) {
        let mut js: Vec<usize> = vars.iter().filter_map(|&v| self.info[v]).collect();
        js.sort_unstable();
        js.dedup();
        for &j in js.iter().rev() {
            self.kernel.remove_space_dims_assign(&[j]);
            for slot in self.info.iter_mut() {
                match *slot {
                    Some(m) if m == j => *slot = None,
                    Some(m) if m > j => *slot = Some(m - 1),
                    _ => {}
                }
            }
        }
        for &v in vars {
            self.info[v] = None;
        }
    }

    pub fn affine_image_assign(&mut self, var: usize, e: &LinExpr, b: &Z, den: &Z) {
        if self.info[var].is_none() {
            self.allocate_kernel_dim(var);
        }
        for i in e.support().iter() {
            if self.info[i].is_none() {
                self.allocate_kernel_dim(i);
            }
        }
        let local_var = self.info[var].unwrap();
        let local_e = self.localize_expr(e);
        self.kernel.affine_image_assign(local_var, &local_e, b, den);
        self.elide_unconstrained();
    }

    /// Grows both mappings to a shared one (dims live on only one side are
    /// kernelized there as unconstrained dims first), then reindexes both
    /// kernels so that the same global dimension always lands at the same
    /// local kernel index. Harmless to apply unconditionally: a freshly
    /// allocated but unconstrained kernel dim represents the same
    /// polyhedron as not having it.
    fn sync_mapping(&mut self, other: &mut UPoly) {
        let mut mapped: Vec<usize> = (0..self.d)
            .filter(|&i| self.info[i].is_some() || other.info[i].is_some())
            .collect();
        mapped.sort_unstable();
        for &i in &mapped {
            if self.info[i].is_none() {
                self.allocate_kernel_dim(i);
            }
        }
        for &i in &mapped {
            if other.info[i].is_none() {
                other.allocate_kernel_dim(i);
            }
        }
        self.reindex_to(&mapped);
        other.reindex_to(&mapped);
    }

    fn reindex_to(&mut self, canonical: &[usize]) {
        let k = self.kernel.space_dim();
        let mut local_to_global = vec![None; k];
        for (i, slot) in self.info.iter().enumerate() {
            if let Some(j) = slot {
                local_to_global[*j] = Some(i);
            }
        }
        let mut pfunc: Vec<Option<usize>> = vec![None; k];
        for j in 0..k {
            if let Some(i) = local_to_global[j] {
                pfunc[j] = canonical.iter().position(|&g| g == i);
            }
        }
        self.kernel.map_space_dims_assign(&pfunc);
        for i in 0..self.d {
            self.info[i] = canonical.iter().position(|&g| g == i);
        }
    }

    pub fn contains(&mut self, other: &mut UPoly) -> bool {
        self.sync_mapping(other);
        self.kernel.contains(&mut other.kernel)
    }

    pub fn equals(&mut self, other: &mut UPoly) -> bool {
        self.sync_mapping(other);
        self.kernel.equals(&mut other.kernel)
    }

    pub fn is_disjoint_from(&mut self, other: &mut UPoly) -> bool {
        self.sync_mapping(other);
        self.kernel.is_disjoint_from(&mut other.kernel)
    }

    pub fn intersection_assign(&mut self, other: &mut UPoly) {
        self.sync_mapping(other);
        self.kernel.intersection_assign(&mut other.kernel);
        self.elide_unconstrained();
    }

    pub fn poly_hull_assign(&mut self, other: &mut UPoly) {
        self.sync_mapping(other);
        self.kernel.poly_hull_assign(&mut other.kernel);
        self.elide_unconstrained();
    }

    pub fn time_elapse_assign(&mut self, other: &mut UPoly) {
        self.sync_mapping(other);
        self.kernel.time_elapse_assign(&mut other.kernel);
        self.elide_unconstrained();
    }

    pub fn widening_assign(&mut self, y: &mut UPoly, upto: Option<&[Con]>) {
        self.sync_mapping(y);
        let localized: Option<Vec<Con>> = upto.map(|cs| cs.iter().map(|c| self.localize_con(c)).collect());
        self.kernel.widening_assign(&mut y.kernel, localized.as_deref());
        self.elide_unconstrained();
    }
}

// ======================================================================
// TESTS

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::Topology;

    #[test]
    fn unconstrained_dims_stay_out_of_the_kernel() {
        let mut u = UPoly::new_universe_with(3, Topology::Closed);
        let mut e = LinExpr::zero_dim(3);
        e.set(0, Z::from(1));
        u.add_con(Con::nonstrict(e, Z::from(0)));
        assert_eq!(u.kernel.space_dim(), 1);
        assert!(u.info[0].is_some());
        assert!(u.info[1].is_none());
        assert!(u.info[2].is_none());
    }

    #[test]
    fn unconstrain_assign_elides_back_out() {
        let mut u = UPoly::new_universe_with(2, Topology::Closed);
        let mut e = LinExpr::zero_dim(2);
        e.set(0, Z::from(1));
        u.add_con(Con::nonstrict(e, Z::from(0)));
        assert!(u.info[0].is_some());
        u.unconstrain_assign(&[0]);
        assert!(u.info[0].is_none());
        assert_eq!(u.kernel.space_dim(), 0);
    }

    #[test]
    fn roundtrip_through_poly_preserves_shape() {
        let mut u = UPoly::new_universe_with(2, Topology::Closed);
        let mut e = LinExpr::zero_dim(2);
        e.set(0, Z::from(1));
        u.add_con(Con::nonstrict(e, Z::from(0)));
        let mut back = UPoly::from_poly(u.to_poly());
        assert!(u.equals(&mut back));
    }

    #[test]
    fn line_on_an_already_elided_dim_is_a_no_op() {
        let mut u = UPoly::new_universe_with(2, Topology::Closed);
        assert_eq!(u.kernel.space_dim(), 0);
        u.add_gen(Gen::line(1));
        assert_eq!(u.kernel.space_dim(), 0);
        assert!(u.info[1].is_none());
    }

    #[test]
    fn contains_syncs_mappings_before_delegating() {
        let mut a = UPoly::new_universe_with(2, Topology::Closed);
        let mut e0 = LinExpr::zero_dim(2);
        e0.set(0, Z::from(1));
        a.add_con(Con::nonstrict(e0, Z::from(0)));
        let mut b = UPoly::new_universe_with(2, Topology::Closed);
        let mut e1 = LinExpr::zero_dim(2);
        e1.set(1, Z::from(1));
        b.add_con(Con::nonstrict(e1, Z::from(0)));
        assert!(!a.contains(&mut b));
        assert!(!b.contains(&mut a));
    }
}

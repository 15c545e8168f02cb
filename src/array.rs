/**
 * A flat array of cell data: `num_fields` values per zone, zones stored
 * contiguously. The array does not know the shape of the zone index space;
 * flux-divergence and reconstruction kernels interpret the zone ordering, the
 * time integrator only needs element-wise arithmetic over whole registers.
 *
 * Registers of this type are aliased by swapping, never by copying: the
 * owning block keeps the slab memory alive and `std::mem::swap` rebinds which
 * handle is "active" when a stage's weighted average degenerates to the
 * identity.
 */
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct FieldArray {

    /// The number of fields stored at each zone.
    num_fields: usize,

    /// The backing array of data.
    data: Vec<f64>,
}




// ============================================================================
impl FieldArray {

    /**
     * Generate a zero-filled array with the given number of fields per zone.
     */
    pub fn zeros(num_fields: usize, num_zones: usize) -> Self {
        Self {
            num_fields,
            data: vec![0.0; num_fields * num_zones],
        }
    }


    /**
     * Generate an array with values defined from a closure of the zone index,
     * returning a fixed-length array. The number of fields is inferred from
     * the size of the array returned by the closure.
     */
    pub fn from_fn<F, const NUM_FIELDS: usize>(num_zones: usize, f: F) -> Self
    where
        F: Fn(usize) -> [f64; NUM_FIELDS]
    {
        let mut data = Vec::with_capacity(num_zones * NUM_FIELDS);

        for index in 0..num_zones {
            data.extend(f(index).iter());
        }
        Self {
            num_fields: NUM_FIELDS,
            data,
        }
    }


    pub fn num_fields(&self) -> usize {
        self.num_fields
    }


    pub fn num_zones(&self) -> usize {
        if self.num_fields == 0 {
            0
        } else {
            self.data.len() / self.num_fields
        }
    }


    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }


    pub fn data(&self) -> &[f64] {
        &self.data
    }


    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }


    /**
     * Overwrite every element with zero, keeping the allocation.
     */
    pub fn zero_clear(&mut self) {
        for x in &mut self.data {
            *x = 0.0;
        }
    }


    /**
     * Compute the in-place weighted average
     *
     * ```text
     * self = w0 * self + w1 * a + w2 * b
     * ```
     *
     * dispatching on which weights are zero, so that a register passed for a
     * vanishing weight is never read. This is what allows the extra register
     * of 3S* schemes to stay unallocated for the integrators that never
     * reference it.
     */
    pub fn weighted_average(&mut self, a: &FieldArray, b: &FieldArray, wght: [f64; 3]) {
        if wght[2] != 0.0 {
            assert_eq!(self.data.len(), a.data.len());
            assert_eq!(self.data.len(), b.data.len());

            for ((u, &ua), &ub) in self.data.iter_mut().zip(&a.data).zip(&b.data) {
                *u = wght[0] * *u + wght[1] * ua + wght[2] * ub;
            }
        } else if wght[1] != 0.0 {
            assert_eq!(self.data.len(), a.data.len());

            for (u, &ua) in self.data.iter_mut().zip(&a.data) {
                *u = wght[0] * *u + wght[1] * ua;
            }
        } else if wght[0] != 1.0 {
            for u in &mut self.data {
                *u = wght[0] * *u;
            }
        }
    }
}




/**
 * The three face-centered components of a divergence-free field. Registers of
 * face data are averaged and swapped component-wise, exactly like the
 * cell-centered registers.
 */
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct FaceField {
    pub x1f: FieldArray,
    pub x2f: FieldArray,
    pub x3f: FieldArray,
}

impl FaceField {

    pub fn zero_clear(&mut self) {
        self.x1f.zero_clear();
        self.x2f.zero_clear();
        self.x3f.zero_clear();
    }

    pub fn weighted_average(&mut self, a: &FaceField, b: &FaceField, wght: [f64; 3]) {
        self.x1f.weighted_average(&a.x1f, &b.x1f, wght);
        self.x2f.weighted_average(&a.x2f, &b.x2f, wght);
        self.x3f.weighted_average(&a.x3f, &b.x3f, wght);
    }
}




/**
 * The three edge-centered components of an electromotive force.
 */
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct EdgeField {
    pub x1e: FieldArray,
    pub x2e: FieldArray,
    pub x3e: FieldArray,
}

impl EdgeField {

    pub fn zero_clear(&mut self) {
        self.x1e.zero_clear();
        self.x2e.zero_clear();
        self.x3e.zero_clear();
    }
}




/**
 * Face fluxes of a cell-centered variable, one array per coordinate axis.
 * Axes a kernel does not use are left empty.
 */
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct FluxRegisters {
    pub x1: FieldArray,
    pub x2: FieldArray,
    pub x3: FieldArray,
}

impl FluxRegisters {

    pub fn zero_clear(&mut self) {
        self.x1.zero_clear();
        self.x2.zero_clear();
        self.x3.zero_clear();
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::FieldArray;


    #[test]
    fn weighted_average_combines_three_registers() {
        let mut u = FieldArray::from_fn(2, |_| [2.0]);
        let a = FieldArray::from_fn(2, |_| [3.0]);
        let b = FieldArray::from_fn(2, |_| [5.0]);

        u.weighted_average(&a, &b, [1.0, 2.0, 4.0]);
        assert_eq!(u.data(), &[28.0, 28.0]);
    }


    #[test]
    fn weighted_average_skips_registers_with_zero_weight() {
        let mut u = FieldArray::from_fn(3, |i| [i as f64]);
        let a = FieldArray::from_fn(3, |_| [10.0]);
        let empty = FieldArray::default();

        // The empty third register must never be read when its weight is zero.
        u.weighted_average(&a, &empty, [1.0, 0.5, 0.0]);
        assert_eq!(u.data(), &[5.0, 6.0, 7.0]);

        u.weighted_average(&a, &empty, [1.0, 0.0, 0.0]);
        assert_eq!(u.data(), &[5.0, 6.0, 7.0]);
    }


    #[test]
    fn weighted_average_with_negated_self_weight() {
        let mut u = FieldArray::from_fn(2, |i| [1.0 + i as f64]);
        let unused = FieldArray::default();

        u.weighted_average(&unused, &unused, [-1.0, 0.0, 0.0]);
        assert_eq!(u.data(), &[-1.0, -2.0]);
    }
}

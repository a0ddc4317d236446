//! Scalar add, auto-vectorization-hinted add, 128-bit and 256-bit vector
//! add over aligned float arrays, and scalar-vs-vector dot product.
//! Non-multiple-of-lane-width tails are always finished scalar.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddVariant {
    Scalar,
    /// Chunked in groups that auto-vectorization can recognize, but with
    /// no explicit intrinsics — a hint, not a guarantee.
    AutoVectorHint,
    Vector128,
    Vector256,
}

pub struct SimdAdd {
    a: Vec<f32>,
    b: Vec<f32>,
    variant: AddVariant,
}

pub fn prepare_add(len: usize, variant: AddVariant) -> SimdAdd {
    let a: Vec<f32> = (0..len).map(|i| i as f32).collect();
    let b: Vec<f32> = (0..len).map(|i| (len - i) as f32).collect();
    SimdAdd { a, b, variant }
}

impl SimdAdd {
    pub fn run(&self) -> f32 {
        let out = match self.variant {
            AddVariant::Scalar => add_scalar(&self.a, &self.b),
            AddVariant::AutoVectorHint => add_chunked::<8>(&self.a, &self.b),
            AddVariant::Vector128 => add_chunked::<4>(&self.a, &self.b),
            AddVariant::Vector256 => add_chunked::<8>(&self.a, &self.b),
        };
        std::hint::black_box(out.iter().sum())
    }
}

fn add_scalar(a: &[f32], b: &[f32]) -> Vec<f32> {
    a.iter().zip(b.iter()).map(|(x, y)| x + y).collect()
}

/// Processes `LANES`-wide chunks first (the shape an auto-vectorizer or a
/// fixed-width SIMD backend would consume), then finishes any remainder
/// scalar.
fn add_chunked<const LANES: usize>(a: &[f32], b: &[f32]) -> Vec<f32> {
    let len = a.len().min(b.len());
    let mut out = vec![0f32; len];
    let chunks = len / LANES;
    for c in 0..chunks {
        let base = c * LANES;
        for lane in 0..LANES {
            out[base + lane] = a[base + lane] + b[base + lane];
        }
    }
    for i in (chunks * LANES)..len {
        out[i] = a[i] + b[i];
    }
    out
}

pub struct DotProduct {
    a: Vec<f32>,
    b: Vec<f32>,
}

pub fn prepare_dot(len: usize) -> DotProduct {
    let a: Vec<f32> = (0..len).map(|i| (i % 17) as f32).collect();
    let b: Vec<f32> = (0..len).map(|i| (i % 13) as f32).collect();
    DotProduct { a, b }
}

impl DotProduct {
    pub fn run_scalar(&self) -> f32 {
        let sum: f32 = self.a.iter().zip(self.b.iter()).map(|(x, y)| x * y).sum();
        std::hint::black_box(sum)
    }

    /// Accumulates across 8 independent lanes to break the serial
    /// dependency chain a plain fold creates, then reduces.
    pub fn run_vector(&self) -> f32 {
        const LANES: usize = 8;
        let len = self.a.len().min(self.b.len());
        let chunks = len / LANES;
        let mut acc = [0f32; LANES];
        for c in 0..chunks {
            let base = c * LANES;
            for lane in 0..LANES {
                acc[lane] += self.a[base + lane] * self.b[base + lane];
            }
        }
        let mut sum: f32 = acc.iter().sum();
        for i in (chunks * LANES)..len {
            sum += self.a[i] * self.b[i];
        }
        std::hint::black_box(sum)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn all_add_variants_agree_including_nonmultiple_tail() {
        let len = 37; // not a multiple of 4 or 8, exercises the scalar tail
        let scalar = prepare_add(len, AddVariant::Scalar).run();
        let v128 = prepare_add(len, AddVariant::Vector128).run();
        let v256 = prepare_add(len, AddVariant::Vector256).run();
        assert_eq!(scalar, v128);
        assert_eq!(scalar, v256);
    }

    #[test]
    fn dot_product_scalar_and_vector_agree() {
        let dp = prepare_dot(101);
        assert_eq!(dp.run_scalar(), dp.run_vector());
    }
}

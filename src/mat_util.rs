use crate::DenseMat;
use ordered_float::NotNan;

/// Find the largest value in a score slice along with its index.
pub fn find_max(values: &[f64]) -> Option<(f64, usize)> {
    values
        .iter()
        .enumerate()
        .max_by_key(|(_, &v)| NotNan::new(v).unwrap())
        .map(|(i, &v)| (v, i))
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Replace a square matrix with the average of itself and its transpose.
pub fn symmetrize(mat: &mut DenseMat) {
    assert_eq!(mat.nrows(), mat.ncols());
    for i in 0..mat.nrows() {
        for j in i + 1..mat.ncols() {
            let v = 0.5 * (mat[[i, j]] + mat[[j, i]]);
            mat[[i, j]] = v;
            mat[[j, i]] = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_find_max() {
        assert_eq!(Some((3., 0)), find_max(&[3.]));
        assert_eq!(Some((10., 4)), find_max(&[3., 5., 1., 5., 10., 0.]));
        assert_eq!(None, find_max(&[]));
    }

    #[test]
    fn test_mean() {
        assert_approx_eq!(0., mean(&[]));
        assert_approx_eq!(2., mean(&[1., 2., 3.]));
        assert_approx_eq!(-0.5, mean(&[-1., 0.]));
    }

    #[test]
    fn test_symmetrize() {
        let mut mat = array![[1., 2., 0.], [4., 5., 1.], [2., 3., 9.]];
        symmetrize(&mut mat);
        assert_eq!(array![[1., 3., 1.], [3., 5., 2.], [1., 2., 9.]], mat);
    }
}

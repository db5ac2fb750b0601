/// Assert that the floating point numbers are equal within the given epsilon.
#[cfg(test)]
macro_rules! assert_float_eq {
    ($a:expr, $b:expr, $eps:expr, $debug:expr) => {{
        // Make variables to avoid evaluating experssions multiple times.
        let a = $a;
        let b = $b;
        let eps = $eps;
        let error = (a - b).abs();
        if error > eps {
            eprintln!("{:?}", $debug);
        }
        assert!(
            error <= eps,
            "Assertion failed: |({}) - ({})| = {:e} <= {:e}",
            a,
            b,
            error,
            eps
        );
    }};
    ($a:expr, $b:expr, $eps:expr) => {
        $crate::macros::assert_float_eq!($a, $b, $eps, "")
    };
}

#[cfg(test)]
macro_rules! assert_f64_eq {
    ($a:expr, $b:expr, $eps:expr, $debug:expr) => {
        $crate::macros::assert_float_eq!($a as f64, $b as f64, $eps as f64, $debug)
    };
    ($a:expr, $b:expr, $eps:expr) => {
        $crate::macros::assert_float_eq!($a as f64, $b as f64, $eps as f64)
    };
    ($a:expr, $b:expr) => {
        $crate::macros::assert_float_eq!($a as f64, $b as f64, f64::EPSILON)
    };
}

/// Assert that two vectors are equal within the given epsilon, componentwise.
#[cfg(test)]
macro_rules! assert_vec_eq {
    ($a:expr, $b:expr, $eps:expr) => {{
        let a = $a;
        let b = $b;
        assert!(
            a.abs_diff_eq(b, $eps),
            "Assertion failed: {:?} != {:?} within {:e}",
            a,
            b,
            $eps
        );
    }};
    ($a:expr, $b:expr) => {
        $crate::macros::assert_vec_eq!($a, $b, 1e-12)
    };
}

#[cfg(test)]
pub(crate) use assert_f64_eq;
#[cfg(test)]
pub(crate) use assert_float_eq;
#[cfg(test)]
pub(crate) use assert_vec_eq;

use super::*;

#[test]
fn identity_reports_itself() {
    assert!(IdentityTransfer.is_identity());
    assert_eq!(IdentityTransfer.eval(0.25).unwrap(), 0.25);
}

#[test]
fn sampled_interpolates_linearly() {
    let f = SampledTransfer::new(vec![0.0, 1.0, 0.0]).unwrap();
    assert_eq!(f.eval(0.0).unwrap(), 0.0);
    assert_eq!(f.eval(0.25).unwrap(), 0.5);
    assert_eq!(f.eval(0.5).unwrap(), 1.0);
    assert_eq!(f.eval(1.0).unwrap(), 0.0);
    assert_eq!(f.eval(7.0).unwrap(), 0.0);
    assert!(f.eval(f64::NAN).is_err());
    assert!(!f.is_identity());
}

#[test]
fn sampled_ramp_is_identity() {
    let f = SampledTransfer::new(vec![0.0, 0.5, 1.0]).unwrap();
    assert!(f.is_identity());
}

#[test]
fn sampled_rejects_short_tables() {
    assert!(SampledTransfer::new(vec![1.0]).is_err());
    assert!(SampledTransfer::new(vec![0.0, f64::INFINITY]).is_err());
}

#[test]
fn exponential_evaluates_and_fails_on_poles() {
    let f = ExponentialTransfer {
        c0: 0.0,
        c1: 1.0,
        n: 2.0,
    };
    assert_eq!(f.eval(0.5).unwrap(), 0.25);
    assert!(!f.is_identity());

    let pole = ExponentialTransfer {
        c0: 0.0,
        c1: 1.0,
        n: -1.0,
    };
    assert!(pole.eval(0.0).is_err());

    let id = ExponentialTransfer {
        c0: 0.0,
        c1: 1.0,
        n: 1.0,
    };
    assert!(id.is_identity());
}

#[test]
fn closure_transfer_forwards() {
    let f = FnTransfer(|x: f64| Ok::<_, anyhow::Error>(1.0 - x));
    assert_eq!(f.eval(0.25).unwrap(), 0.75);
    assert!(!f.is_identity());
}

use complex_linalg::diagnostics::{diagnose_eig, diagnose_lup, diagnose_qr, diagnose_svd, diagnose_tridiag};
use complex_linalg::{KernelConfig, Matrix};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let a = Matrix::create("[4 1 -2 2; 1 2 0 1; -2 0 3 -2; 2 1 -2 -1]")?;
    let config = KernelConfig::default();
    println!("A =\n{}", a);
    println!("rank = {}, det = {}", a.rank(None), a.det()?);

    let lup = a.lup()?;
    println!("LUP: L =\n{}U =\n{}", lup.l, lup.u);

    let qr = a.qr_with(&config)?;
    println!("QR: R =\n{}", qr.r);

    let tri = a.tridiagonalize_with(&config)?;
    println!("tridiagonal H =\n{}", tri.h);

    let eig = a.eig_with(&config)?;
    println!("eigenvalues: {:?}", eig.eigenvalues());

    let svd = a.svd_with(&config)?;
    println!("singular values: {:?}", svd.singular_values());
    println!("pinv(A) =\n{}", a.pinv_with(&config)?);

    let reports = [
        diagnose_lup(&a, &lup)?,
        diagnose_qr(&a, &qr)?,
        diagnose_tridiag(&a, &tri)?,
        diagnose_eig(&a, &eig)?,
        diagnose_svd(&a, &svd)?,
    ];
    for report in &reports {
        println!(
            "{:<15} reconstruction {:.3e}  orthogonality {:.3e}",
            report.decomposition,
            report.reconstruction_error_abs.unwrap_or(f64::NAN),
            report.orthogonality_error.unwrap_or(f64::NAN),
        );
    }
    Ok(())
}

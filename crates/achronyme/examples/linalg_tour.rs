//! Factorizations over the handle arena: LU, QR, Cholesky and the
//! dominant eigenpair of a small SPD matrix.

use achronyme::Engine;

fn main() {
    let mut engine = Engine::new();

    let a = engine
        .create_matrix(vec![4.0, 1.0, 0.0, 1.0, 4.0, 1.0, 0.0, 1.0, 4.0], 3, 3)
        .expect("create matrix");

    let (l, u, p) = engine.lu(a).expect("lu");
    println!("L = {:?}", engine.get_matrix(l).expect("L"));
    println!("U = {:?}", engine.get_matrix(u).expect("U"));
    println!("P = {:?}", engine.get_matrix(p).expect("P"));

    let (q, r) = engine.qr(a).expect("qr");
    println!("Q = {:?}", engine.get_matrix(q).expect("Q"));
    println!("R = {:?}", engine.get_matrix(r).expect("R"));

    if engine.is_positive_definite(a).expect("spd check") {
        let chol = engine.cholesky(a).expect("cholesky");
        println!("chol(A) = {:?}", engine.get_matrix(chol).expect("L"));
    }

    let (lambda, v) = engine.power_iteration(a, 500, 1e-12).expect("eigenpair");
    println!(
        "dominant eigenpair: lambda = {lambda:.6}, v = {:?}",
        engine.get_vector(v).expect("eigenvector")
    );

    println!("det(A) = {}", engine.det(a).expect("det"));

    // The same matrix is reachable from expression source too.
    engine.bind_variable_to_handle("a", a).expect("bind");
    println!("trace via eval: {}", engine.eval("trace(a)").expect("trace"));
    println!(
        "eigenvalues via eval: {}",
        engine.eval("qr_eigenvalues(a)").expect("eigenvalues")
    );
}

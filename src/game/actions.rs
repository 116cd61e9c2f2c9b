/// Every `(x, y)` coordinate of an `n × n` board in row-major order.
///
/// This is the fixed universe of policy outputs: action `i` is
/// `generate_actions(n)[i]`.
pub fn generate_actions(size: usize) -> Vec<(usize, usize)> {
    (0..size)
        .flat_map(|x| (0..size).map(move |y| (x, y)))
        .collect()
}

use proc_macro::TokenStream;

mod memo;

/// Builds a memo from other memos or vars.
///
/// ```ignore
/// let sum = memo!(|a, b| a + b);
/// let strict_sum = memo!(strict |a, b| a + b);
/// ```
///
/// expands to a memo whose dependencies are `[a.get(), b.get()]` and whose value is `body`, with
/// `a` and `b` bound to references to the dependency values.
#[proc_macro]
pub fn memo(input: TokenStream) -> TokenStream {
    memo::memo(input)
}

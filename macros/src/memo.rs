use proc_macro2::TokenStream;
use quote::quote;
use syn::{
    parse::{Parse, ParseStream},
    parse2,
    punctuated::Punctuated,
    Error, Expr, Ident, Result, Token,
};

/// `memo!(|a, b| body)` or `memo!(strict |a, b| body)`.
///
/// Each argument names a memo or var in scope. The generated memo depends on their current values
/// and binds them by reference, in order, to the same names inside `body`.
struct Memo {
    strict: bool,
    args: Vec<Ident>,
    body: Expr,
}

impl Parse for Memo {
    fn parse(input: ParseStream) -> Result<Self> {
        let strict = if input.peek(Ident) {
            let mode: Ident = input.parse()?;
            if mode != "strict" {
                return Err(Error::new(mode.span(), "expected `strict` or `|`"));
            }
            true
        } else {
            false
        };
        input.parse::<Token! {|}>()?;
        let args = Punctuated::<Ident, Token![,]>::parse_separated_nonempty(input)?;
        input.parse::<Token! {|}>()?;
        let body = input.parse()?;
        Ok(Memo {
            strict,
            args: args.into_iter().collect(),
            body,
        })
    }
}

pub fn memo(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = TokenStream::from(input);
    let output = match memo_int(input) {
        Ok(output) => output,
        Err(e) => e.to_compile_error(),
    };
    proc_macro::TokenStream::from(output)
}

pub fn memo_int(input: TokenStream) -> Result<TokenStream> {
    let memo: Memo = parse2(input)?;
    let identifiers = &memo.args;
    let constructor = if memo.strict {
        quote! { strict }
    } else {
        quote! { new }
    };
    let body = &memo.body;

    Ok(quote! {
        {
            #(let #identifiers = #identifiers.clone();)*
            ::yzal::Memo::#constructor(
                move || ::std::vec![#(#identifiers.get()),*],
                move |__deps| match __deps {
                    [#(#identifiers),*] => #body,
                    _ => ::std::unreachable!("memo! dependencies have a fixed arity"),
                },
            )
        }
    })
}

#[cfg(test)]
mod tests {
    use super::memo_int;
    use quote::quote;

    #[test]
    fn expands_to_loose_memo() {
        let output = memo_int(quote! { |a, b| a + b }).unwrap().to_string();
        assert!(output.contains(":: yzal :: Memo :: new"));
        assert!(output.contains("let a = a . clone ()"));
        assert!(output.contains("[a , b] => a + b"));
    }

    #[test]
    fn expands_to_strict_memo() {
        let output = memo_int(quote! { strict |a| a.len() }).unwrap().to_string();
        assert!(output.contains(":: yzal :: Memo :: strict"));
    }

    #[test]
    fn rejects_unknown_mode() {
        let err = memo_int(quote! { loose |a| a }).unwrap_err();
        assert_eq!(err.to_string(), "expected `strict` or `|`");
    }

    #[test]
    fn requires_arguments() {
        assert!(memo_int(quote! { || 1 }).is_err());
    }
}

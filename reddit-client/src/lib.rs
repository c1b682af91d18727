pub mod api;
pub mod auth;
pub mod callback;
pub mod fetcher;
pub mod handshake;


pub use api::{RedditApiClient, RedditListing, RedditPostData};
pub use auth::{
    AuthorizationRequest, HandshakeState, RedditClient, RedditOAuth2Config, RedditToken,
    TokenDuration,
};
pub use callback::{CallbackListener, CallbackParams};
pub use fetcher::{select_hot_posts, AuthorizedListings, ForumFetcher, ListingSource};
pub use handshake::{
    complete_pasted_redirect, run_handshake, AuthUrlPresenter, ConsolePresenter,
};

pub mod ranking_routes;

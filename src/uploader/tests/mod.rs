mod impl_http_test;
